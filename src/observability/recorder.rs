//! Metrics Recorder Trait
//!
//! Exposition goes through this trait so the export logic can run against:
//! - Production: DogStatsD client (`datadog` feature)
//! - Tests: in-memory recording
//! - Disabled: no-op

use parking_lot::Mutex;
use std::sync::Arc;

/// Sink for exported series
pub trait MetricsRecorder: Send + Sync + 'static {
    /// Set a point-in-time value
    fn gauge(&self, name: &str, value: f64, tags: &[&str]);

    /// Report a cumulative total (monotonic since server start)
    fn counter(&self, name: &str, value: f64, tags: &[&str]);
}

/// No-op metrics recorder
#[derive(Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {
    #[inline]
    fn gauge(&self, _name: &str, _value: f64, _tags: &[&str]) {}
    #[inline]
    fn counter(&self, _name: &str, _value: f64, _tags: &[&str]) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Gauge,
    Counter,
}

/// Recorded metric for testing
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMetric {
    pub name: String,
    pub value: f64,
    pub tags: Vec<String>,
    pub metric_type: MetricType,
}

/// In-memory recorder - keeps every series for verification
#[derive(Default)]
pub struct SimulatedMetrics {
    recorded: Mutex<Vec<RecordedMetric>>,
}

impl SimulatedMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded metrics
    pub fn get_recorded(&self) -> Vec<RecordedMetric> {
        self.recorded.lock().clone()
    }

    /// Get metrics by name
    pub fn get_by_name(&self, name: &str) -> Vec<RecordedMetric> {
        self.recorded
            .lock()
            .iter()
            .filter(|m| m.name == name)
            .cloned()
            .collect()
    }

    /// Value of the series with this name carrying every tag in `tags`
    pub fn value_of(&self, name: &str, tags: &[&str]) -> Option<f64> {
        self.recorded
            .lock()
            .iter()
            .find(|m| m.name == name && tags.iter().all(|t| m.tags.iter().any(|mt| mt == t)))
            .map(|m| m.value)
    }

    /// Clear all recorded metrics
    pub fn clear(&self) {
        self.recorded.lock().clear();
    }

    fn push(&self, name: &str, value: f64, tags: &[&str], metric_type: MetricType) {
        self.recorded.lock().push(RecordedMetric {
            name: name.to_string(),
            value,
            tags: tags.iter().map(|s| s.to_string()).collect(),
            metric_type,
        });
    }
}

impl MetricsRecorder for SimulatedMetrics {
    fn gauge(&self, name: &str, value: f64, tags: &[&str]) {
        self.push(name, value, tags, MetricType::Gauge);
    }

    fn counter(&self, name: &str, value: f64, tags: &[&str]) {
        self.push(name, value, tags, MetricType::Counter);
    }
}

/// Arc wrapper for trait object usage
pub type SharedMetrics = Arc<dyn MetricsRecorder>;

/// Create a no-op metrics recorder
pub fn noop_metrics() -> SharedMetrics {
    Arc::new(NoopMetrics)
}

/// Create an in-memory metrics recorder for testing
pub fn simulated_metrics() -> Arc<SimulatedMetrics> {
    Arc::new(SimulatedMetrics::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_metrics_records() {
        let metrics = SimulatedMetrics::new();

        metrics.gauge("test.gauge", 100.0, &["pool:global"]);
        metrics.counter("test.counter", 42.0, &[]);

        let recorded = metrics.get_recorded();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[0].metric_type, MetricType::Gauge);
        assert_eq!(recorded[1].metric_type, MetricType::Counter);
        assert_eq!(metrics.value_of("test.gauge", &["pool:global"]), Some(100.0));
        assert_eq!(metrics.value_of("test.gauge", &["pool:other"]), None);
    }

    #[test]
    fn test_clear_metrics() {
        let metrics = SimulatedMetrics::new();
        metrics.gauge("a", 1.0, &[]);
        metrics.clear();
        assert!(metrics.get_recorded().is_empty());
    }

    #[test]
    fn test_noop_metrics_no_panic() {
        let metrics = noop_metrics();
        metrics.gauge("test", 1.0, &[]);
        metrics.counter("test", 1.0, &["x:y"]);
    }
}
