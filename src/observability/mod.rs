//! Observability Module
//!
//! - Structured logging via `tracing`
//! - Exposition of decoded statistics through [`MetricsRecorder`]
//! - DogStatsD delivery when the `datadog` feature is enabled
//!
//! # Usage
//!
//! ```rust,ignore
//! use connpool_stats::observability::{init_tracing, export_conn_pool_stats, noop_metrics};
//!
//! init_tracing(&config)?;
//! let metrics = noop_metrics();
//! export_conn_pool_stats(&stats, metrics.as_ref());
//! ```

pub mod export;
#[cfg(feature = "datadog")]
pub mod metrics;
pub mod recorder;
pub mod tracing_setup;

pub use export::{
    export_ap_counters, export_conn_pool_stats, export_shard_conn_pool_stats,
    export_sharding_statistics, export_topology,
};
#[cfg(feature = "datadog")]
pub use metrics::Metrics;
pub use recorder::{
    noop_metrics, simulated_metrics, MetricType, MetricsRecorder, NoopMetrics, RecordedMetric,
    SharedMetrics, SimulatedMetrics,
};
pub use tracing_setup::init as init_tracing;
