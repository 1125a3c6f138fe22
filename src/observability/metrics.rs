//! DogStatsD Metrics Client
//!
//! Non-blocking UDP metrics client for Datadog.
//! Gracefully degrades if the Datadog agent is unavailable.

use dogstatsd::{Client, Options};
use std::sync::Arc;

use super::recorder::MetricsRecorder;
use crate::config::CollectorConfig;

/// Metrics client wrapper with graceful degradation
#[derive(Clone)]
pub struct Metrics {
    client: Arc<Option<Client>>,
    prefix: String,
}

impl Metrics {
    /// Create a new metrics client from configuration
    pub fn new(config: &CollectorConfig) -> Self {
        let client = match Client::new(Options {
            to_addr: config.statsd_addr.clone(),
            ..Default::default()
        }) {
            Ok(c) => {
                tracing::info!("DogStatsD client connected to {}", config.statsd_addr);
                Some(c)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to create DogStatsD client: {}. Metrics disabled.",
                    e
                );
                None
            }
        };

        Metrics {
            client: Arc::new(client),
            prefix: config.metric_prefix.clone(),
        }
    }
}

impl MetricsRecorder for Metrics {
    #[inline]
    fn gauge(&self, name: &str, value: f64, tags: &[&str]) {
        if let Some(ref client) = *self.client {
            let metric_name = format!("{}.{}", self.prefix, name);
            let _ = client.gauge(&metric_name, value.to_string(), tags);
        }
    }

    /// Totals are already cumulative on the server side, so they go out as
    /// gauges rather than statsd increments.
    #[inline]
    fn counter(&self, name: &str, value: f64, tags: &[&str]) {
        self.gauge(name, value, tags)
    }
}
