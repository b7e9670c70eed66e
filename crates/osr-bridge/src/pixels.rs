//! Pixel buffers delivered by the engine's paint callback.

use crate::geometry::{DirtyRect, Rect};
use std::sync::Arc;
use thiserror::Error;

/// Bytes per pixel for both the base and the popup layer (BGRA, 8 bits each)
pub const BYTES_PER_PIXEL: usize = 4;

/// Which compositor layer a paint addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// The page itself, drawn over the full surface
    Base,
    /// Transient overlay (select dropdowns etc.), drawn above the base
    Popup,
}

impl Layer {
    pub fn from_popup_flag(is_popup: bool) -> Self {
        if is_popup { Layer::Popup } else { Layer::Base }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PixelBufferError {
    #[error("Pixel buffer is {actual} bytes, expected {expected} for {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Immutable snapshot of one paint callback's pixels.
///
/// Tightly packed rows, no padding, `width * 4` bytes per row.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    data: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    pub fn new(data: impl Into<Arc<[u8]>>, width: u32, height: u32) -> Result<Self, PixelBufferError> {
        let data = data.into();
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(PixelBufferError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    /// A buffer filled with a single BGRA value
    pub fn filled(width: u32, height: u32, bgra: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * BYTES_PER_PIXEL);
        for _ in 0..pixels {
            data.extend_from_slice(&bgra);
        }
        Self {
            data: data.into(),
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Byte offset of pixel (x, y)
    pub fn offset_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride() + x as usize * BYTES_PER_PIXEL
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = self.offset_of(x, y);
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[at..at + BYTES_PER_PIXEL]);
        Some(px)
    }

    /// Rows covered by `region`, each sliced to the region's width.
    ///
    /// `region` must already lie inside the buffer.
    pub fn rows(&self, region: DirtyRect) -> impl Iterator<Item = &[u8]> + '_ {
        let row_bytes = region.width as usize * BYTES_PER_PIXEL;
        (region.y as u32..region.y as u32 + region.height).map(move |y| {
            let start = self.offset_of(region.x as u32, y);
            &self.data[start..start + row_bytes]
        })
    }
}

/// Clamp engine-reported dirty rectangles to the buffer they describe.
///
/// Empty or fully out-of-range rectangles are dropped.
pub fn clamp_dirty_regions(regions: &[DirtyRect], buffer: &PixelBuffer) -> Vec<DirtyRect> {
    let bounds = buffer.bounds();
    regions
        .iter()
        .filter_map(|region| region.intersect(&bounds))
        .collect()
}
