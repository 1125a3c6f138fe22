//! Tracing Setup
//!
//! Initializes tracing-subscriber with environment-based filtering.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::CollectorConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. JSON output is used when
/// `log_json` is set.
pub fn init(config: &CollectorConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    tracing::info!(
        source_dir = %config.source_dir.display(),
        interval_ms = config.interval_ms,
        json = config.log_json,
        "tracing initialized"
    );

    Ok(())
}
