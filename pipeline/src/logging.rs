//! Structured logging initialization via `tracing`.

use crate::config::PipelineConfig;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber from the pipeline configuration.
///
/// The `RUST_LOG` environment variable, when set, overrides the configured
/// level filter.
pub fn init_tracing(config: &PipelineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
