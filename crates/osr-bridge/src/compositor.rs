//! Frame compositor - paint callbacks in, composited frames out.
//!
//! Owns texture state for the base page layer and the optional popup layer.
//! Uploads arrive on the engine's callback thread, composites run on the GPU
//! context; both go through the same lock, so a composite never observes a
//! half-uploaded layer.

use crate::geometry::{DirtyRect, PopupRect, ViewRect};
use crate::pixels::{Layer, PixelBuffer, clamp_dirty_regions};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositorError {
    #[error("Compositor used before init")]
    NotInitialized,

    #[error("Compositor already disposed")]
    Disposed,

    #[error("Texture backend error: {0}")]
    Backend(String),
}

/// Compositor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Upload only dirty rectangles. Disable to force whole-texture uploads
    /// on graphics stacks where sub-image updates are slow or broken.
    pub partial_upload: bool,
    /// Background for areas the base layer doesn't cover (RGBA)
    pub clear_color: [f32; 4],
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            partial_upload: true,
            clear_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// What to draw this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeFrame {
    /// Surface bounds; the base layer covers all of it
    pub view: ViewRect,
    pub clear_color: [f32; 4],
    /// Size of the base texture, if any paint arrived yet
    pub base: Option<(u32, u32)>,
    /// Where the popup texture goes, if one is showing
    pub popup: Option<PopupRect>,
}

/// Graphics API behind the compositor.
///
/// Uploads may be called from the engine thread, `draw` from the GPU
/// context; the compositor serializes all calls.
pub trait TextureBackend: Send {
    fn init(&mut self) -> Result<(), CompositorError>;

    /// Whether `upload` may address a sub-rectangle of the texture
    fn supports_partial_upload(&self) -> bool {
        true
    }

    /// (Re)create the layer's texture at the given size. Contents undefined.
    fn allocate(&mut self, layer: Layer, width: u32, height: u32) -> Result<(), CompositorError>;

    /// Copy `region` of `buffer` into the same region of the layer texture
    fn upload(
        &mut self,
        layer: Layer,
        region: DirtyRect,
        buffer: &PixelBuffer,
    ) -> Result<(), CompositorError>;

    fn release(&mut self, layer: Layer);

    fn draw(&mut self, frame: &CompositeFrame) -> Result<(), CompositorError>;

    fn dispose(&mut self);
}

/// Result of a paint callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    /// Texture updated; the host should redraw
    Uploaded { regions: usize, reallocated: bool },
    /// Nothing to upload (empty dirty list, popup not showing)
    Skipped,
    /// Compositor disposed; paint tolerated and dropped
    Ignored,
}

impl PaintOutcome {
    pub fn needs_redraw(&self) -> bool {
        matches!(self, PaintOutcome::Uploaded { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LayerTexture {
    width: u32,
    height: u32,
}

struct CompositorState<B> {
    backend: B,
    base: Option<LayerTexture>,
    popup: Option<LayerTexture>,
    popup_rect: Option<PopupRect>,
    initialized: bool,
    disposed: bool,
}

impl<B> CompositorState<B> {
    fn layer_mut(&mut self, layer: Layer) -> &mut Option<LayerTexture> {
        match layer {
            Layer::Base => &mut self.base,
            Layer::Popup => &mut self.popup,
        }
    }
}

/// Base + popup texture compositor
pub struct FrameCompositor<B: TextureBackend> {
    state: Mutex<CompositorState<B>>,
    config: CompositorConfig,
    transparent: bool,
}

impl<B: TextureBackend> FrameCompositor<B> {
    pub fn new(backend: B, config: CompositorConfig, transparent: bool) -> Self {
        Self {
            state: Mutex::new(CompositorState {
                backend,
                base: None,
                popup: None,
                popup_rect: None,
                initialized: false,
                disposed: false,
            }),
            config,
            transparent,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CompositorState<B>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create GPU resources. Idempotent.
    pub fn init(&self) -> Result<(), CompositorError> {
        let mut state = self.lock();
        if state.disposed {
            return Err(CompositorError::Disposed);
        }
        if state.initialized {
            return Ok(());
        }
        state.backend.init()?;
        state.initialized = true;
        debug!("Compositor initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    /// Apply one paint callback to the addressed layer.
    ///
    /// A size change reallocates the texture and uploads the whole buffer;
    /// otherwise only the dirty rectangles are copied.
    pub fn on_paint(
        &self,
        layer: Layer,
        dirty_regions: &[DirtyRect],
        buffer: &PixelBuffer,
    ) -> Result<PaintOutcome, CompositorError> {
        let mut state = self.lock();
        if state.disposed {
            return Ok(PaintOutcome::Ignored);
        }
        if !state.initialized {
            return Err(CompositorError::NotInitialized);
        }
        if layer == Layer::Popup && state.popup_rect.is_none() {
            trace!("Popup paint without a popup rect, skipping");
            return Ok(PaintOutcome::Skipped);
        }

        if buffer.bounds().is_empty() {
            return Ok(PaintOutcome::Skipped);
        }

        let size = LayerTexture {
            width: buffer.width(),
            height: buffer.height(),
        };
        let reallocated = *state.layer_mut(layer) != Some(size);
        let partial = !reallocated
            && self.config.partial_upload
            && state.backend.supports_partial_upload();

        let regions = if partial {
            clamp_dirty_regions(dirty_regions, buffer)
        } else {
            vec![buffer.bounds()]
        };
        if regions.is_empty() {
            return Ok(PaintOutcome::Skipped);
        }

        if reallocated {
            debug!(
                "Reallocating {:?} texture at {}x{}",
                layer, size.width, size.height
            );
            *state.layer_mut(layer) = None;
            state.backend.allocate(layer, size.width, size.height)?;
            *state.layer_mut(layer) = Some(size);
        }

        for region in &regions {
            if let Err(e) = state.backend.upload(layer, *region, buffer) {
                // Forget the texture so the next paint re-uploads everything
                // instead of patching over a partially written frame.
                *state.layer_mut(layer) = None;
                return Err(e);
            }
        }

        Ok(PaintOutcome::Uploaded {
            regions: regions.len(),
            reallocated,
        })
    }

    /// Position of the popup for subsequent composites
    pub fn on_popup_size(&self, rect: PopupRect) {
        let mut state = self.lock();
        if state.disposed {
            return;
        }
        debug!("Popup rect {}", rect);
        state.popup_rect = Some(rect);
    }

    /// Drop the popup layer entirely
    pub fn clear_popup(&self) {
        let mut state = self.lock();
        state.popup_rect = None;
        if state.popup.take().is_some() && !state.disposed {
            state.backend.release(Layer::Popup);
        }
    }

    pub fn popup_rect(&self) -> Option<PopupRect> {
        self.lock().popup_rect
    }

    /// Draw base over the full view, then the popup at its rect
    pub fn composite(&self, view: ViewRect) -> Result<(), CompositorError> {
        let mut state = self.lock();
        if state.disposed {
            return Err(CompositorError::Disposed);
        }
        if !state.initialized {
            return Err(CompositorError::NotInitialized);
        }

        let popup = match (state.popup, state.popup_rect) {
            (Some(_), Some(rect)) => Some(rect),
            _ => None,
        };
        let frame = CompositeFrame {
            view,
            clear_color: if self.transparent {
                [0.0; 4]
            } else {
                self.config.clear_color
            },
            base: state.base.map(|t| (t.width, t.height)),
            popup,
        };
        state.backend.draw(&frame)
    }

    /// Release all resources. Later paints become no-ops.
    pub fn dispose(&self) {
        let mut state = self.lock();
        if state.disposed {
            return;
        }
        if state.initialized {
            if state.base.take().is_some() {
                state.backend.release(Layer::Base);
            }
            if state.popup.take().is_some() {
                state.backend.release(Layer::Popup);
            }
            state.backend.dispose();
        }
        state.popup_rect = None;
        state.disposed = true;
        debug!("Compositor disposed");
    }

    /// Inspect the backend (diagnostics, tests)
    pub fn with_backend<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(&self.lock().backend)
    }
}
