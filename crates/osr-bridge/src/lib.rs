//! OSR Bridge - Off-Screen Browser Rendering
//!
//! Connects a native browser engine that paints into CPU pixel buffers to a
//! host-owned GPU surface. Covers lazy browser creation, window handle
//! resolution, dirty-rect texture uploads, popup compositing and input
//! forwarding.

mod compositor;
mod config;
mod creation;
mod dispatch;
mod drag;
mod engine;
mod geometry;
mod handle;
mod input;
mod lifecycle;
mod pixels;
mod software;

#[cfg(test)]
mod mock;

pub use compositor::{
    CompositeFrame, CompositorConfig, CompositorError, FrameCompositor, PaintOutcome,
    TextureBackend,
};
pub use config::{ConfigError, OsrConfig};
pub use creation::{BrowserCreationController, BrowserKind, BrowserLifecycleState, CreationOutcome};
pub use dispatch::{ChannelDispatcher, HostDispatcher, HostRequest, HostRequests};
pub use drag::{Capability, DragOperations, Unsupported};
pub use engine::{
    BrowserId, CreateBrowserParams, CreateDevToolsParams, CursorType, EngineError, NativeEngine,
    SurfaceHandle, WindowHandle,
};
pub use geometry::{DirtyRect, Point, PopupRect, Rect, ScreenPoint, ViewGeometry, ViewRect};
pub use handle::{NativeSurface, WindowHandleResolver};
pub use input::{
    FocusEvent, InputDisposition, InputEvent, InputEventSource, InputEventTranslator, InputSink,
    KeyEvent, KeyEventKind, Modifiers, MouseButton, NoOverlays, OverlayDismisser, PointerEvent,
    PointerEventKind, WheelEvent,
};
pub use lifecycle::{OsrBrowser, OsrBrowserBuilder, RenderHandler};
pub use pixels::{BYTES_PER_PIXEL, Layer, PixelBuffer, PixelBufferError, clamp_dirty_regions};
pub use software::SoftwareBackend;
