//! Bridge configuration.
//!
//! Loaded from TOML by the host; every field has a default so an empty file
//! is a valid configuration.

use crate::compositor::CompositorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid start URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Clear color component {0} is outside 0.0..=1.0")]
    InvalidClearColor(f32),
}

/// Settings for one OSR browser bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsrConfig {
    /// Page loaded when the browser is created
    pub start_url: String,
    /// Render with an alpha channel instead of an opaque background
    pub transparent: bool,
    /// Named request context (cookie/cache partition), engine default if unset
    pub request_context: Option<String>,
    /// `tracing` filter directive used when `RUST_LOG` is not set
    pub log_filter: String,
    pub compositor: CompositorConfig,
}

impl Default for OsrConfig {
    fn default() -> Self {
        Self {
            start_url: "about:blank".to_string(),
            transparent: false,
            request_context: None,
            log_filter: "info".to_string(),
            compositor: CompositorConfig::default(),
        }
    }
}

impl OsrConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.start_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.start_url.clone(),
            reason: e.to_string(),
        })?;

        if let Some(bad) = self
            .compositor
            .clear_color
            .iter()
            .copied()
            .find(|c| !(0.0..=1.0).contains(c))
        {
            return Err(ConfigError::InvalidClearColor(bad));
        }
        Ok(())
    }
}
