//! Native engine boundary.
//!
//! The engine itself (process boundary, FFI) lives outside this crate. The
//! bridge only talks to it through [`NativeEngine`], and the engine drives
//! the bridge back through [`crate::RenderHandler`].

use crate::geometry::Point;
use crate::input::{KeyEvent, PointerEvent, WheelEvent};
use std::fmt;
use thiserror::Error;

/// Platform window handle in the engine's representation.
///
/// Zero means "not resolvable yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowHandle(pub u64);

impl WindowHandle {
    pub const NULL: WindowHandle = WindowHandle(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Raw handle reported by the host surface before conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Identifier the engine assigns to a created browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrowserId(pub u64);

impl fmt::Display for BrowserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Browser({})", self.0)
    }
}

/// Cursor shapes the engine asks the host to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorType {
    Default,
    Crosshair,
    Text,
    Wait,
    Hand,
    Move,
    ResizeNorth,
    ResizeSouth,
    ResizeEast,
    ResizeWest,
    ResizeNorthEast,
    ResizeNorthWest,
    ResizeSouthEast,
    ResizeSouthWest,
    /// Engine-specific cursor id without a portable equivalent
    Custom(i32),
}

impl CursorType {
    /// Map the engine's numeric cursor id onto a portable shape
    pub fn from_id(id: i32) -> Self {
        match id {
            0 => Self::Default,
            1 => Self::Crosshair,
            2 => Self::Text,
            3 => Self::Wait,
            4 => Self::ResizeSouthWest,
            5 => Self::ResizeSouthEast,
            6 => Self::ResizeNorthWest,
            7 => Self::ResizeNorthEast,
            8 => Self::ResizeNorth,
            9 => Self::ResizeSouth,
            10 => Self::ResizeWest,
            11 => Self::ResizeEast,
            12 => Self::Hand,
            13 => Self::Move,
            other => Self::Custom(other),
        }
    }
}

/// Everything the engine needs to create a regular browser
#[derive(Debug, Clone, PartialEq)]
pub struct CreateBrowserParams {
    pub window_handle: WindowHandle,
    pub url: String,
    pub transparent: bool,
    pub request_context: Option<String>,
}

/// Everything the engine needs to create a DevTools browser for `parent`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDevToolsParams {
    pub parent: BrowserId,
    pub window_handle: WindowHandle,
    pub transparent: bool,
    pub inspect_at: Option<Point>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Engine rejected browser creation: {0}")]
    CreationRejected(String),

    #[error("Engine is shutting down")]
    ShuttingDown,
}

/// Operations the native engine exposes to the bridge.
///
/// Calls may come from the UI, GPU or engine callback context, so
/// implementations must be thread-safe.
pub trait NativeEngine: Send + Sync {
    /// Convert the host surface's raw handle into the engine's representation
    fn window_handle_from_surface(&self, surface: SurfaceHandle) -> WindowHandle {
        WindowHandle(surface.0)
    }

    fn create_browser(&self, params: CreateBrowserParams) -> Result<(), EngineError>;

    fn create_dev_tools(&self, params: CreateDevToolsParams) -> Result<(), EngineError>;

    fn send_pointer_event(&self, event: &PointerEvent);

    fn send_key_event(&self, event: &KeyEvent);

    fn send_wheel_event(&self, event: &WheelEvent);

    fn set_focus(&self, focused: bool);

    /// Tell the engine the view changed size; it answers with a full repaint
    fn notify_view_size_changed(&self, width: u32, height: u32);
}
