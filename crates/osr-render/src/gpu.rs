//! GPU Context - wgpu adapter and device for layer compositing

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use wgpu::{
    Adapter, Device, DeviceDescriptor, Features, Instance, InstanceDescriptor, Limits,
    PowerPreference, Queue, RequestAdapterOptions, Surface,
};

/// GPU context errors
#[derive(Debug, Error)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Failed to create device: {0}")]
    DeviceCreation(String),

    #[error("Surface error: {0}")]
    Surface(String),
}

/// GPU configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuConfig {
    /// Prefer low-power GPU (integrated) over high-performance (discrete)
    pub low_power: bool,
    /// Largest layer texture the device must accept
    pub max_texture_dimension: u32,
    /// Present with vsync
    pub vsync: bool,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            low_power: true,
            max_texture_dimension: 8192,
            vsync: true,
        }
    }
}

/// GPU context holding wgpu device and queue
pub struct GpuContext {
    pub instance: Instance,
    pub adapter: Adapter,
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
    pub config: GpuConfig,
}

impl GpuContext {
    /// Create a new GPU context.
    ///
    /// `compatible_surface` steers adapter selection towards one that can
    /// present to the host window.
    pub async fn new(
        instance: Instance,
        compatible_surface: Option<&Surface<'_>>,
        config: GpuConfig,
    ) -> Result<Self, GpuError> {
        info!("Initializing GPU context (low_power: {})", config.low_power);

        let power_preference = if config.low_power {
            PowerPreference::LowPower
        } else {
            PowerPreference::HighPerformance
        };

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let adapter_info = adapter.get_info();
        info!(
            "GPU adapter: {} ({:?})",
            adapter_info.name, adapter_info.backend
        );
        debug!(
            "GPU driver: {} (vendor: {})",
            adapter_info.driver, adapter_info.vendor
        );

        let supported = adapter.limits().max_texture_dimension_2d;
        if supported < config.max_texture_dimension {
            warn!(
                "Adapter limits textures to {}px, requested {}px",
                supported, config.max_texture_dimension
            );
        }
        let limits = Limits {
            max_texture_dimension_2d: config.max_texture_dimension.min(supported),
            ..Limits::downlevel_webgl2_defaults()
        };

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: Some("OSR GPU Device"),
                    required_features: Features::empty(),
                    required_limits: limits,
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await
            .map_err(|e| GpuError::DeviceCreation(e.to_string()))?;

        device.on_uncaptured_error(Box::new(|error| {
            warn!("wgpu error: {}", error);
        }));

        info!("GPU context initialized successfully");

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
            config,
        })
    }

    /// Headless context with default configuration
    pub async fn with_defaults() -> Result<Self, GpuError> {
        Self::new(default_instance(), None, GpuConfig::default()).await
    }

    /// Largest texture side the device accepts
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}

/// Instance over every backend wgpu supports on this platform
pub fn default_instance() -> Instance {
    Instance::new(&InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_config_defaults() {
        let config = GpuConfig::default();
        assert!(config.low_power);
        assert!(config.vsync);
        assert_eq!(config.max_texture_dimension, 8192);
    }

    // GPU tests require actual hardware, skip in CI
    #[test]
    #[ignore = "requires GPU"]
    fn test_gpu_context_creation() {
        let ctx = pollster::block_on(GpuContext::with_defaults());
        assert!(ctx.is_ok());
    }
}
