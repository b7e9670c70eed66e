//! CPU texture backend.
//!
//! Keeps each layer as a plain BGRA byte array and composites into a CPU
//! framebuffer. Used for headless hosts and to observe compositor output.

use crate::compositor::{CompositeFrame, CompositorError, TextureBackend};
use crate::geometry::{DirtyRect, Rect};
use crate::pixels::{BYTES_PER_PIXEL, Layer, PixelBuffer};
use tracing::trace;

#[derive(Debug, Clone)]
struct CpuTexture {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl CpuTexture {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = y as usize * self.stride() + x as usize * BYTES_PER_PIXEL;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[at..at + BYTES_PER_PIXEL]);
        Some(px)
    }
}

/// Software implementation of [`TextureBackend`]
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    no_partial_upload: bool,
    base: Option<CpuTexture>,
    popup: Option<CpuTexture>,
    framebuffer: Option<CpuTexture>,
    uploads: Vec<(Layer, DirtyRect)>,
    init_count: usize,
    dispose_count: usize,
    fail_next_upload: bool,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that only accepts whole-texture uploads
    pub fn without_partial_upload() -> Self {
        Self {
            no_partial_upload: true,
            ..Self::default()
        }
    }

    fn texture(&self, layer: Layer) -> Option<&CpuTexture> {
        match layer {
            Layer::Base => self.base.as_ref(),
            Layer::Popup => self.popup.as_ref(),
        }
    }

    fn texture_mut(&mut self, layer: Layer) -> &mut Option<CpuTexture> {
        match layer {
            Layer::Base => &mut self.base,
            Layer::Popup => &mut self.popup,
        }
    }

    pub fn layer_size(&self, layer: Layer) -> Option<(u32, u32)> {
        self.texture(layer).map(|t| (t.width, t.height))
    }

    pub fn layer_pixel(&self, layer: Layer, x: u32, y: u32) -> Option<[u8; 4]> {
        self.texture(layer).and_then(|t| t.pixel(x, y))
    }

    /// Pixel of the last composited frame
    pub fn framebuffer_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.framebuffer.as_ref().and_then(|f| f.pixel(x, y))
    }

    /// Last composited frame as (bytes, width, height)
    pub fn framebuffer(&self) -> Option<(&[u8], u32, u32)> {
        self.framebuffer
            .as_ref()
            .map(|f| (f.data.as_slice(), f.width, f.height))
    }

    /// Every upload performed so far, in order
    pub fn upload_log(&self) -> &[(Layer, DirtyRect)] {
        &self.uploads
    }

    pub fn init_count(&self) -> usize {
        self.init_count
    }

    pub fn dispose_count(&self) -> usize {
        self.dispose_count
    }

    /// Make the next upload fail, as a lost device would
    pub fn fail_next_upload(&mut self) {
        self.fail_next_upload = true;
    }
}

/// Premultiplied source-over of `src` onto `dst`
fn blend_over(dst: &mut [u8], src: &[u8]) {
    let inv_alpha = 255 - src[3] as u32;
    for i in 0..BYTES_PER_PIXEL {
        let blended = src[i] as u32 + (dst[i] as u32 * inv_alpha + 127) / 255;
        dst[i] = blended.min(255) as u8;
    }
}

/// Draw `texture` into `target` with its top-left corner at `at`
fn draw_texture(target: &mut CpuTexture, texture: &CpuTexture, at: Rect) {
    let target_bounds = Rect::from_size(target.width, target.height);
    let placed = Rect::new(
        at.x,
        at.y,
        at.width.min(texture.width),
        at.height.min(texture.height),
    );
    let Some(visible) = placed.intersect(&target_bounds) else {
        return;
    };

    for y in 0..visible.height {
        let dst_y = (visible.y as u32 + y) as usize;
        let src_y = (visible.y - at.y) as usize + y as usize;
        for x in 0..visible.width {
            let dst_x = (visible.x as u32 + x) as usize;
            let src_x = (visible.x - at.x) as usize + x as usize;
            let src_at = src_y * texture.stride() + src_x * BYTES_PER_PIXEL;
            let dst_at = dst_y * target.stride() + dst_x * BYTES_PER_PIXEL;
            blend_over(
                &mut target.data[dst_at..dst_at + BYTES_PER_PIXEL],
                &texture.data[src_at..src_at + BYTES_PER_PIXEL],
            );
        }
    }
}

/// RGBA float color to a BGRA byte pixel
fn clear_pixel(color: [f32; 4]) -> [u8; 4] {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [to_byte(color[2]), to_byte(color[1]), to_byte(color[0]), to_byte(color[3])]
}

impl TextureBackend for SoftwareBackend {
    fn init(&mut self) -> Result<(), CompositorError> {
        self.init_count += 1;
        Ok(())
    }

    fn supports_partial_upload(&self) -> bool {
        !self.no_partial_upload
    }

    fn allocate(&mut self, layer: Layer, width: u32, height: u32) -> Result<(), CompositorError> {
        *self.texture_mut(layer) = Some(CpuTexture::new(width, height));
        Ok(())
    }

    fn upload(
        &mut self,
        layer: Layer,
        region: DirtyRect,
        buffer: &PixelBuffer,
    ) -> Result<(), CompositorError> {
        if std::mem::take(&mut self.fail_next_upload) {
            return Err(CompositorError::Backend("simulated upload failure".to_string()));
        }

        let texture = self
            .texture_mut(layer)
            .as_mut()
            .ok_or_else(|| CompositorError::Backend(format!("{:?} texture missing", layer)))?;
        if texture.width != buffer.width() || texture.height != buffer.height() {
            return Err(CompositorError::Backend(format!(
                "{:?} texture is {}x{}, buffer is {}x{}",
                layer,
                texture.width,
                texture.height,
                buffer.width(),
                buffer.height()
            )));
        }

        let stride = texture.stride();
        for (row, src) in buffer.rows(region).enumerate() {
            let y = region.y as usize + row;
            let start = y * stride + region.x as usize * BYTES_PER_PIXEL;
            texture.data[start..start + src.len()].copy_from_slice(src);
        }

        trace!("Uploaded {:?} region {}", layer, region);
        self.uploads.push((layer, region));
        Ok(())
    }

    fn release(&mut self, layer: Layer) {
        *self.texture_mut(layer) = None;
    }

    fn draw(&mut self, frame: &CompositeFrame) -> Result<(), CompositorError> {
        let mut target = CpuTexture::new(frame.view.width, frame.view.height);
        let clear = clear_pixel(frame.clear_color);
        for px in target.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&clear);
        }

        if let (Some(_), Some(base)) = (frame.base, self.base.as_ref()) {
            draw_texture(&mut target, base, Rect::from_size(base.width, base.height));
        }
        if let (Some(rect), Some(popup)) = (frame.popup, self.popup.as_ref()) {
            draw_texture(&mut target, popup, rect);
        }

        self.framebuffer = Some(target);
        Ok(())
    }

    fn dispose(&mut self) {
        self.dispose_count += 1;
        self.base = None;
        self.popup = None;
        self.framebuffer = None;
    }
}
