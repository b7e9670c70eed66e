//! winit window as the bridge's native surface.

use osr_bridge::{NativeSurface, Point, ScreenPoint, SurfaceHandle};
use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};
use winit::window::Window;

/// Numeric id of a platform window, zero if the platform has none we can use
pub fn raw_window_id(raw: RawWindowHandle) -> u64 {
    match raw {
        RawWindowHandle::Xlib(h) => h.window as u64,
        RawWindowHandle::Xcb(h) => h.window.get() as u64,
        RawWindowHandle::Wayland(h) => h.surface.as_ptr() as usize as u64,
        RawWindowHandle::Win32(h) => h.hwnd.get() as usize as u64,
        RawWindowHandle::AppKit(h) => h.ns_view.as_ptr() as usize as u64,
        other => {
            debug!("No window id for {:?}", other);
            0
        }
    }
}

pub struct WinitSurface {
    window: Arc<Window>,
    locked: AtomicBool,
}

impl WinitSurface {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            locked: AtomicBool::new(false),
        }
    }
}

impl NativeSurface for WinitSurface {
    fn lock_surface(&self) -> bool {
        if self.window.window_handle().is_err() {
            trace!("Window handle unavailable");
            return false;
        }
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn unlock_surface(&self) {
        self.locked.store(false, Ordering::Release);
    }

    fn surface_handle(&self) -> SurfaceHandle {
        let id = self
            .window
            .window_handle()
            .map(|handle| raw_window_id(handle.as_raw()))
            .unwrap_or(0);
        SurfaceHandle(id)
    }

    fn location_on_screen(&self) -> Option<ScreenPoint> {
        // Not available on Wayland
        self.window
            .inner_position()
            .ok()
            .map(|p| Point::new(p.x, p.y))
    }
}
