//! Connection-pool statistics collector
//!
//! Reads captured monitoring replies, groups pool statistics by shard and
//! exports them on an interval.
//!
//! Usage: `connpool-stats [config.toml] [--once]`

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use connpool_stats::observability::{init_tracing, SharedMetrics};
use connpool_stats::{Collector, CollectorConfig, FileSource};
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let once = args.iter().any(|a| a == "--once");
    let config_path = args.iter().find(|a| !a.starts_with("--"));

    let mut config = match config_path {
        Some(path) => CollectorConfig::from_file(Path::new(path))?,
        None => CollectorConfig::default(),
    }
    .with_env_overrides()?;
    config.once |= once;

    init_tracing(&config)?;

    let metrics = metrics(&config);
    let collector = Collector::new(FileSource::new(config.source_dir.clone()));
    info!(
        source = %collector.source().dir().display(),
        interval_ms = config.interval_ms,
        "collector started"
    );

    if config.once {
        let snapshot = collector.collect().await;
        snapshot.export(metrics.as_ref());
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let mut interval = tokio::time::interval(config.interval());
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let snapshot = collector.collect().await;
                if snapshot.is_empty() {
                    error!("collection cycle produced no data");
                    continue;
                }
                snapshot.export(metrics.as_ref());
            }
            _ = signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(feature = "datadog")]
fn metrics(config: &CollectorConfig) -> SharedMetrics {
    Arc::new(connpool_stats::observability::Metrics::new(config))
}

#[cfg(not(feature = "datadog"))]
fn metrics(_config: &CollectorConfig) -> SharedMetrics {
    info!("datadog feature disabled, metrics are not exported");
    Arc::new(connpool_stats::observability::NoopMetrics)
}
