//! Window handle resolution for the realized drawable.
//!
//! The engine binds its output to the platform handle of the host surface.
//! That handle only exists once the surface is realized, and an OSR browser
//! can never be reparented, so the first non-null handle is cached for the
//! lifetime of the bridge.

use crate::engine::{NativeEngine, SurfaceHandle, WindowHandle};
use crate::geometry::ScreenPoint;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// The host toolkit's drawable, as seen by the bridge
pub trait NativeSurface: Send + Sync {
    /// Take exclusive access to the underlying native surface.
    ///
    /// Returns `false` when the surface is not realized yet.
    fn lock_surface(&self) -> bool;

    fn unlock_surface(&self);

    /// Platform handle of the surface. Only called while locked.
    fn surface_handle(&self) -> SurfaceHandle;

    /// Origin of the surface on screen, `None` while not shown
    fn location_on_screen(&self) -> Option<ScreenPoint>;
}

/// Releases the surface lock on every exit path
struct SurfaceLock<'a> {
    surface: &'a dyn NativeSurface,
}

impl<'a> SurfaceLock<'a> {
    fn acquire(surface: &'a dyn NativeSurface) -> Option<Self> {
        surface.lock_surface().then_some(Self { surface })
    }
}

impl Drop for SurfaceLock<'_> {
    fn drop(&mut self) {
        self.surface.unlock_surface();
    }
}

/// Resolves and caches the window handle of the render surface
pub struct WindowHandleResolver {
    surface: Arc<dyn NativeSurface>,
    engine: Arc<dyn NativeEngine>,
    cached: Mutex<WindowHandle>,
}

impl WindowHandleResolver {
    pub fn new(surface: Arc<dyn NativeSurface>, engine: Arc<dyn NativeEngine>) -> Self {
        Self {
            surface,
            engine,
            cached: Mutex::new(WindowHandle::NULL),
        }
    }

    /// Resolve the handle, or return [`WindowHandle::NULL`] if the surface
    /// isn't realized yet. Callers retry on their next natural trigger.
    pub fn resolve(&self) -> WindowHandle {
        // Held across the physical resolution so only one caller performs it.
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if !cached.is_null() {
            return *cached;
        }

        let Some(_lock) = SurfaceLock::acquire(self.surface.as_ref()) else {
            debug!("Surface not realized, window handle unavailable");
            return WindowHandle::NULL;
        };

        let raw = self.surface.surface_handle();
        let handle = self.engine.window_handle_from_surface(raw);
        if handle.is_null() {
            warn!("Realized surface reported a null window handle");
            return WindowHandle::NULL;
        }

        info!("Resolved window handle {}", handle);
        *cached = handle;
        handle
    }

    /// The cached handle without attempting resolution
    pub fn cached(&self) -> WindowHandle {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn surface(&self) -> &Arc<dyn NativeSurface> {
        &self.surface
    }
}
