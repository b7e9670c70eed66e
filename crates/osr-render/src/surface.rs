//! Render Surface - presentation target for composited frames

use crate::gpu::{GpuContext, GpuError};
use std::sync::Arc;
use tracing::{debug, info, warn};
use wgpu::{
    CommandEncoder, CompositeAlphaMode, Device, Queue, Surface, SurfaceConfiguration,
    SurfaceError, SurfaceTexture, TextureFormat, TextureUsages, TextureView,
};

/// Surface configuration
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    pub vsync: bool,
    /// Let the window system see through transparent pixels
    pub transparent: bool,
}

impl SurfaceConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            vsync: true,
            transparent: false,
        }
    }
}

/// Pick the swapchain format.
///
/// Engine pixels are already display-encoded BGRA, so a non-sRGB BGRA target
/// passes them through untouched.
pub fn preferred_format(formats: &[TextureFormat]) -> Option<TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| *f == TextureFormat::Bgra8Unorm)
        .or_else(|| formats.iter().copied().find(|f| !f.is_srgb()))
        .or_else(|| formats.first().copied())
}

fn preferred_alpha_mode(modes: &[CompositeAlphaMode], transparent: bool) -> CompositeAlphaMode {
    if transparent && modes.contains(&CompositeAlphaMode::PreMultiplied) {
        return CompositeAlphaMode::PreMultiplied;
    }
    modes.first().copied().unwrap_or(CompositeAlphaMode::Auto)
}

/// Render surface for a window
pub struct RenderSurface<'window> {
    surface: Surface<'window>,
    config: SurfaceConfiguration,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl<'window> RenderSurface<'window> {
    /// Configure `surface` for presenting on `gpu`
    pub fn new(
        gpu: &GpuContext,
        surface: Surface<'window>,
        config: SurfaceConfig,
    ) -> Result<Self, GpuError> {
        info!("Creating render surface ({}x{})", config.width, config.height);

        let caps = surface.get_capabilities(&gpu.adapter);
        let format = preferred_format(&caps.formats)
            .ok_or_else(|| GpuError::Surface("surface reports no formats".to_string()))?;
        debug!("Surface format: {:?}", format);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: config.width.max(1),
            height: config.height.max(1),
            present_mode: if config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            desired_maximum_frame_latency: 2,
            alpha_mode: preferred_alpha_mode(&caps.alpha_modes, config.transparent),
            view_formats: vec![],
        };

        surface.configure(&gpu.device, &surface_config);

        Ok(Self {
            surface,
            config: surface_config,
            device: gpu.device.clone(),
            queue: gpu.queue.clone(),
        })
    }

    /// Resize the surface
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if width == self.config.width && height == self.config.height {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        debug!("Surface resized to {}x{}", width, height);
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn format(&self) -> TextureFormat {
        self.config.format
    }

    /// Begin a new frame
    pub fn begin_frame(&self) -> Result<Frame, GpuError> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(|e| GpuError::Surface(e.to_string()))?
            }
            Err(e) => return Err(GpuError::Surface(e.to_string())),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Composite Encoder"),
            });

        Ok(Frame {
            output,
            view,
            encoder,
            queue: self.queue.clone(),
        })
    }
}

/// A frame being rendered
pub struct Frame {
    output: SurfaceTexture,
    view: TextureView,
    encoder: CommandEncoder,
    queue: Arc<Queue>,
}

impl Frame {
    /// Start the composite pass, cleared to `color`
    pub fn begin_pass(&mut self, color: wgpu::Color) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Composite Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }

    /// Submit the frame and present
    pub fn present(self) {
        self.queue.submit(std::iter::once(self.encoder.finish()));
        self.output.present();
    }
}
