//! Host configuration file.
//!
//! ```toml
//! [window]
//! title = "OSR Host"
//! width = 1024
//! height = 768
//!
//! [gpu]
//! low_power = true
//!
//! [browser]
//! start_url = "https://example.com/"
//! ```

use anyhow::{Context, Result};
use osr_bridge::OsrConfig;
use osr_render::GpuConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    /// Initial inner size in logical pixels
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "OSR Host".to_string(),
            width: 1024,
            height: 768,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub window: WindowSettings,
    pub gpu: GpuConfig,
    pub browser: OsrConfig,
}

impl HostConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).context("Failed to parse host config")?;
        config.browser.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&source)
    }
}
