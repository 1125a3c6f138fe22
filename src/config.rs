use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error type for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read
    Io(PathBuf, std::io::Error),
    /// Config file is not valid TOML for this schema
    Parse(PathBuf, toml::de::Error),
    /// Environment override has an unusable value
    InvalidEnv { var: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "failed to read {}: {}", path.display(), e),
            ConfigError::Parse(path, e) => write!(f, "failed to parse {}: {}", path.display(), e),
            ConfigError::InvalidEnv { var, value } => {
                write!(f, "invalid value for {}: {:?}", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
            ConfigError::InvalidEnv { .. } => None,
        }
    }
}

/// Collector process configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Directory the file-backed source reads command replies from
    pub source_dir: PathBuf,
    /// Collection interval in milliseconds
    pub interval_ms: u64,
    /// Run a single cycle and print the snapshot
    pub once: bool,
    /// Prefix for exported metric names
    pub metric_prefix: String,
    /// DogStatsD address (only used with the `datadog` feature)
    pub statsd_addr: String,
    /// Emit logs as JSON
    pub log_json: bool,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            source_dir: PathBuf::from("."),
            interval_ms: 10_000,
            once: false,
            metric_prefix: "mongodb".to_string(),
            statsd_addr: "127.0.0.1:8125".to_string(),
            log_json: false,
            log_level: "info".to_string(),
        }
    }
}

impl CollectorConfig {
    /// Load from a TOML file; missing keys take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Defaults overridden by `CONNPOOL_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply `CONNPOOL_*` environment variables on top of this config
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `CONNPOOL_SOURCE_DIR` | `source_dir` |
    /// | `CONNPOOL_INTERVAL_MS` | `interval_ms` |
    /// | `CONNPOOL_METRIC_PREFIX` | `metric_prefix` |
    /// | `CONNPOOL_STATSD_ADDR` | `statsd_addr` |
    /// | `CONNPOOL_LOG_JSON` | `log_json` |
    /// | `CONNPOOL_LOG_LEVEL` | `log_level` |
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(dir) = lookup("CONNPOOL_SOURCE_DIR") {
            self.source_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("CONNPOOL_INTERVAL_MS") {
            self.interval_ms = value.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "CONNPOOL_INTERVAL_MS",
                value,
            })?;
        }
        if let Some(prefix) = lookup("CONNPOOL_METRIC_PREFIX") {
            self.metric_prefix = prefix;
        }
        if let Some(addr) = lookup("CONNPOOL_STATSD_ADDR") {
            self.statsd_addr = addr;
        }
        if let Some(value) = lookup("CONNPOOL_LOG_JSON") {
            let flag = match value.as_str() {
                "1" | "true" => Some(true),
                "0" | "false" => Some(false),
                _ => None,
            };
            self.log_json = flag.ok_or(ConfigError::InvalidEnv {
                var: "CONNPOOL_LOG_JSON",
                value,
            })?;
        }
        if let Some(level) = lookup("CONNPOOL_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(self)
    }

    /// Get collection interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "source_dir = \"/var/lib/connpool\"").unwrap();
        writeln!(file, "interval_ms = 2500").unwrap();

        let config = CollectorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("/var/lib/connpool"));
        assert_eq!(config.interval(), Duration::from_millis(2500));
        assert_eq!(config.metric_prefix, "mongodb");
    }

    #[test]
    fn test_from_file_errors() {
        let missing = CollectorConfig::from_file(Path::new("/nonexistent/connpool.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(..))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "interval_ms = \"soon\"").unwrap();
        let bad = CollectorConfig::from_file(file.path());
        assert!(matches!(bad, Err(ConfigError::Parse(..))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("CONNPOOL_INTERVAL_MS", "500"),
            ("CONNPOOL_LOG_JSON", "true"),
            ("CONNPOOL_METRIC_PREFIX", "mongos"),
        ]
        .into_iter()
        .collect();

        let config = CollectorConfig::default()
            .with_overrides(|var| env.get(var).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.interval_ms, 500);
        assert!(config.log_json);
        assert_eq!(config.metric_prefix, "mongos");
    }

    #[test]
    fn test_invalid_override() {
        let result = CollectorConfig::default().with_overrides(|var| {
            (var == "CONNPOOL_INTERVAL_MS").then(|| "fast".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv {
                var: "CONNPOOL_INTERVAL_MS",
                ..
            })
        ));
    }
}
