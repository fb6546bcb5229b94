//! Pipeline configuration with TOML file support.

use crate::error::PipelineError;
use attest_types::PipelineParams;
use serde::{Deserialize, Serialize};

/// Configuration for the verification pipeline.
///
/// Can be loaded from a TOML file via [`PipelineConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Decision thresholds and extractor tuning knobs.
    #[serde(default)]
    pub params: PipelineParams,

    /// Maximum number of attempts processed concurrently.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_attempts: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_max_concurrent() -> usize {
    8
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, PipelineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PipelineError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, PipelineError> {
        toml::from_str(s).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("PipelineConfig is always serializable to TOML")
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            params: PipelineParams::default(),
            max_concurrent_attempts: default_max_concurrent(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
