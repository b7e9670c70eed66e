//! Recording doubles for the engine and host collaborators.

use crate::creation::{BrowserCreationController, BrowserKind};
use crate::engine::{
    CreateBrowserParams, CreateDevToolsParams, EngineError, NativeEngine, SurfaceHandle,
};
use crate::geometry::ScreenPoint;
use crate::handle::{NativeSurface, WindowHandleResolver};
use crate::input::{KeyEvent, OverlayDismisser, PointerEvent, WheelEvent};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_URL: &str = "https://example.com/";

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    CreateBrowser(CreateBrowserParams),
    CreateDevTools(CreateDevToolsParams),
    Pointer(PointerEvent),
    Key(KeyEvent),
    Wheel(WheelEvent),
    SetFocus(bool),
    Resize(u32, u32),
}

type CreateHook = Box<dyn Fn() + Send + Sync>;

pub struct MockEngine {
    calls: Mutex<Vec<EngineCall>>,
    reject: bool,
    on_create: Mutex<Option<CreateHook>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reject: false,
            on_create: Mutex::new(None),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::new()
        }
    }

    /// Run `hook` from inside every create call, like an engine that
    /// confirms creation synchronously
    pub fn on_create(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_create.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn created(&self) -> Vec<CreateBrowserParams> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                EngineCall::CreateBrowser(params) => Some(params.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn resizes(&self) -> Vec<(u32, u32)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                EngineCall::Resize(w, h) => Some((*w, *h)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn finish_create(&self) -> Result<(), EngineError> {
        if self.reject {
            return Err(EngineError::CreationRejected("mock".to_string()));
        }
        if let Some(hook) = self.on_create.lock().unwrap().as_ref() {
            hook();
        }
        Ok(())
    }
}

impl NativeEngine for MockEngine {
    fn create_browser(&self, params: CreateBrowserParams) -> Result<(), EngineError> {
        self.record(EngineCall::CreateBrowser(params));
        self.finish_create()
    }

    fn create_dev_tools(&self, params: CreateDevToolsParams) -> Result<(), EngineError> {
        self.record(EngineCall::CreateDevTools(params));
        self.finish_create()
    }

    fn send_pointer_event(&self, event: &PointerEvent) {
        self.record(EngineCall::Pointer(*event));
    }

    fn send_key_event(&self, event: &KeyEvent) {
        self.record(EngineCall::Key(*event));
    }

    fn send_wheel_event(&self, event: &WheelEvent) {
        self.record(EngineCall::Wheel(*event));
    }

    fn set_focus(&self, focused: bool) {
        self.record(EngineCall::SetFocus(focused));
    }

    fn notify_view_size_changed(&self, width: u32, height: u32) {
        self.record(EngineCall::Resize(width, height));
    }
}

pub struct MockSurface {
    realized: AtomicBool,
    handle: AtomicU64,
    locks: AtomicUsize,
    locked: AtomicBool,
    location: Mutex<Option<ScreenPoint>>,
}

impl MockSurface {
    pub fn unrealized() -> Self {
        Self {
            realized: AtomicBool::new(false),
            handle: AtomicU64::new(0),
            locks: AtomicUsize::new(0),
            locked: AtomicBool::new(false),
            location: Mutex::new(None),
        }
    }

    pub fn realized(handle: u64) -> Self {
        let surface = Self::unrealized();
        surface.realize(handle);
        surface
    }

    pub fn realize(&self, handle: u64) {
        self.handle.store(handle, Ordering::SeqCst);
        self.realized.store(true, Ordering::SeqCst);
    }

    pub fn set_handle(&self, handle: u64) {
        self.handle.store(handle, Ordering::SeqCst);
    }

    pub fn set_location(&self, location: ScreenPoint) {
        *self.location.lock().unwrap() = Some(location);
    }

    /// Number of lock attempts, successful or not
    pub fn lock_count(&self) -> usize {
        self.locks.load(Ordering::SeqCst)
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }
}

impl NativeSurface for MockSurface {
    fn lock_surface(&self) -> bool {
        self.locks.fetch_add(1, Ordering::SeqCst);
        if !self.realized.load(Ordering::SeqCst) {
            return false;
        }
        assert!(!self.locked.swap(true, Ordering::SeqCst), "surface locked twice");
        true
    }

    fn unlock_surface(&self) {
        self.locked.store(false, Ordering::SeqCst);
    }

    fn surface_handle(&self) -> SurfaceHandle {
        assert!(self.is_locked(), "handle queried without lock");
        SurfaceHandle(self.handle.load(Ordering::SeqCst))
    }

    fn location_on_screen(&self) -> Option<ScreenPoint> {
        *self.location.lock().unwrap()
    }
}

#[derive(Default)]
pub struct MockOverlays {
    dismissed: AtomicUsize,
}

impl MockOverlays {
    pub fn dismissals(&self) -> usize {
        self.dismissed.load(Ordering::SeqCst)
    }
}

impl OverlayDismisser for MockOverlays {
    fn dismiss_transient_overlays(&self) {
        self.dismissed.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn controller(
    engine: Arc<MockEngine>,
    surface: Arc<MockSurface>,
) -> Arc<BrowserCreationController> {
    let resolver = Arc::new(WindowHandleResolver::new(surface, engine.clone()));
    Arc::new(BrowserCreationController::new(
        resolver,
        engine,
        BrowserKind::Page {
            url: TEST_URL.to_string(),
            request_context: None,
        },
        false,
    ))
}

/// Controller whose browser is already created and confirmed
pub fn bound_controller(engine: Arc<MockEngine>) -> Arc<BrowserCreationController> {
    let ctl = controller(engine, Arc::new(MockSurface::realized(1)));
    ctl.request_creation(true);
    ctl.on_native_ready();
    ctl
}
