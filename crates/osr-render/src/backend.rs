//! wgpu texture backend for the frame compositor.
//!
//! Each layer is a `Bgra8Unorm` texture; paints are copied with
//! `Queue::write_texture` straight out of the engine's pixel buffer, and a
//! composite draws the layers as quads into the window surface.

use crate::gpu::{GpuContext, GpuError};
use crate::quad::QuadPipeline;
use crate::surface::RenderSurface;
use osr_bridge::{
    BYTES_PER_PIXEL, CompositeFrame, CompositorError, DirtyRect, Layer, PixelBuffer, Rect,
    TextureBackend,
};
use std::sync::Arc;
use tracing::{debug, trace};
use wgpu::{BindGroup, Device, Queue, Texture, TextureFormat};

/// Pixel layout of every engine buffer
pub const LAYER_FORMAT: TextureFormat = TextureFormat::Bgra8Unorm;

impl From<GpuError> for CompositorError {
    fn from(err: GpuError) -> Self {
        CompositorError::Backend(err.to_string())
    }
}

/// Source offset and row pitch for copying `region` out of `buffer`
pub fn copy_layout(buffer: &PixelBuffer, region: DirtyRect) -> wgpu::TexelCopyBufferLayout {
    wgpu::TexelCopyBufferLayout {
        offset: buffer.offset_of(region.x as u32, region.y as u32) as u64,
        bytes_per_row: Some(buffer.stride() as u32),
        rows_per_image: Some(region.height),
    }
}

/// Clear color in the surface's channel order
fn wgpu_color(rgba: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: rgba[0] as f64,
        g: rgba[1] as f64,
        b: rgba[2] as f64,
        a: rgba[3] as f64,
    }
}

struct LayerTexture {
    texture: Texture,
    bind_group: BindGroup,
    width: u32,
    height: u32,
}

/// GPU implementation of [`TextureBackend`]
pub struct WgpuBackend {
    device: Arc<Device>,
    queue: Arc<Queue>,
    surface: RenderSurface<'static>,
    max_texture_dimension: u32,
    pipeline: Option<QuadPipeline>,
    base: Option<LayerTexture>,
    popup: Option<LayerTexture>,
}

impl WgpuBackend {
    pub fn new(gpu: &GpuContext, surface: RenderSurface<'static>) -> Self {
        Self {
            device: gpu.device.clone(),
            queue: gpu.queue.clone(),
            surface,
            max_texture_dimension: gpu.max_texture_dimension(),
            pipeline: None,
            base: None,
            popup: None,
        }
    }

    fn layer(&self, layer: Layer) -> Option<&LayerTexture> {
        match layer {
            Layer::Base => self.base.as_ref(),
            Layer::Popup => self.popup.as_ref(),
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut Option<LayerTexture> {
        match layer {
            Layer::Base => &mut self.base,
            Layer::Popup => &mut self.popup,
        }
    }

    pub fn surface(&self) -> &RenderSurface<'static> {
        &self.surface
    }
}

impl TextureBackend for WgpuBackend {
    fn init(&mut self) -> Result<(), CompositorError> {
        if self.pipeline.is_none() {
            self.pipeline = Some(QuadPipeline::new(
                &self.device,
                &self.queue,
                self.surface.format(),
            ));
            debug!("Composite pipeline created");
        }
        Ok(())
    }

    fn allocate(&mut self, layer: Layer, width: u32, height: u32) -> Result<(), CompositorError> {
        if width > self.max_texture_dimension || height > self.max_texture_dimension {
            return Err(CompositorError::Backend(format!(
                "{}x{} exceeds the {}px texture limit",
                width, height, self.max_texture_dimension
            )));
        }
        let pipeline = self.pipeline.as_ref().ok_or(CompositorError::NotInitialized)?;

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(match layer {
                Layer::Base => "Base Layer",
                Layer::Popup => "Popup Layer",
            }),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = pipeline.bind_group(&self.device, &view);

        debug!("Allocated {:?} texture {}x{}", layer, width, height);
        *self.layer_mut(layer) = Some(LayerTexture {
            texture,
            bind_group,
            width,
            height,
        });
        Ok(())
    }

    fn upload(
        &mut self,
        layer: Layer,
        region: DirtyRect,
        buffer: &PixelBuffer,
    ) -> Result<(), CompositorError> {
        let target = self
            .layer(layer)
            .ok_or_else(|| CompositorError::Backend(format!("{:?} texture missing", layer)))?;
        if target.width != buffer.width() || target.height != buffer.height() {
            return Err(CompositorError::Backend(format!(
                "{:?} texture is {}x{}, buffer is {}x{}",
                layer,
                target.width,
                target.height,
                buffer.width(),
                buffer.height()
            )));
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: region.x as u32,
                    y: region.y as u32,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            buffer.bytes(),
            copy_layout(buffer, region),
            wgpu::Extent3d {
                width: region.width,
                height: region.height,
                depth_or_array_layers: 1,
            },
        );

        trace!(
            "Uploaded {:?} region {} ({} bytes)",
            layer,
            region,
            region.width as usize * region.height as usize * BYTES_PER_PIXEL
        );
        Ok(())
    }

    fn release(&mut self, layer: Layer) {
        if let Some(released) = self.layer_mut(layer).take() {
            released.texture.destroy();
        }
    }

    fn draw(&mut self, frame: &CompositeFrame) -> Result<(), CompositorError> {
        let pipeline = self.pipeline.as_mut().ok_or(CompositorError::NotInitialized)?;
        self.surface.resize(frame.view.width, frame.view.height);

        let mut quads: Vec<(&BindGroup, Rect)> = Vec::with_capacity(QuadPipeline::MAX_QUADS);
        if let (Some(_), Some(base)) = (frame.base, self.base.as_ref()) {
            quads.push((&base.bind_group, Rect::from_size(base.width, base.height)));
        }
        if let (Some(rect), Some(popup)) = (frame.popup, self.popup.as_ref()) {
            quads.push((&popup.bind_group, Rect::new(rect.x, rect.y, popup.width, popup.height)));
        }

        let mut target = self.surface.begin_frame()?;
        {
            let mut pass = target.begin_pass(wgpu_color(frame.clear_color));
            pipeline.render(&self.queue, &mut pass, frame.view, &quads);
        }
        target.present();
        Ok(())
    }

    fn dispose(&mut self) {
        self.release(Layer::Base);
        self.release(Layer::Popup);
        self.pipeline = None;
        debug!("wgpu backend disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_layout_addresses_region_origin() {
        let buffer = PixelBuffer::filled(100, 50, [0; 4]);
        let layout = copy_layout(&buffer, Rect::new(10, 20, 30, 5));
        assert_eq!(layout.offset, (20 * 400 + 10 * 4) as u64);
        assert_eq!(layout.bytes_per_row, Some(400));
        assert_eq!(layout.rows_per_image, Some(5));
    }

    #[test]
    fn test_copy_layout_full_buffer() {
        let buffer = PixelBuffer::filled(8, 8, [0; 4]);
        let layout = copy_layout(&buffer, buffer.bounds());
        assert_eq!(layout.offset, 0);
        assert_eq!(layout.bytes_per_row, Some(32));
    }

    #[test]
    fn test_clear_color_mapping() {
        let c = wgpu_color([1.0, 0.5, 0.0, 1.0]);
        assert_eq!((c.r, c.g, c.b, c.a), (1.0, 0.5, 0.0, 1.0));
    }

    #[test]
    #[ignore = "requires GPU"]
    fn test_headless_upload() {
        let gpu = pollster::block_on(GpuContext::with_defaults()).unwrap();
        let pipeline = QuadPipeline::new(&gpu.device, &gpu.queue, LAYER_FORMAT);
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: None,
            size: wgpu::Extent3d {
                width: 16,
                height: 16,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let _bind_group = pipeline.bind_group(&gpu.device, &view);

        let buffer = PixelBuffer::filled(16, 16, [0, 0, 255, 255]);
        let region = Rect::new(4, 4, 3, 3);
        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x: 4, y: 4, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            buffer.bytes(),
            copy_layout(&buffer, region),
            wgpu::Extent3d {
                width: 3,
                height: 3,
                depth_or_array_layers: 1,
            },
        );
        gpu.queue.submit(std::iter::empty());
    }
}
