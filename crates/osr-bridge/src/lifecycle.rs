//! Off-screen browser - surface lifecycle glue.
//!
//! [`OsrBrowser`] is driven from two sides:
//! - the host surface calls `init` / `reshape` / `display` / `dispose`
//!   (UI and GPU contexts);
//! - the engine calls the [`RenderHandler`] callbacks from its own thread.
//!
//! View geometry is published as one snapshot so engine-thread readers
//! always see a consistent rect/origin pair.

use crate::compositor::{CompositorError, FrameCompositor, TextureBackend};
use crate::config::OsrConfig;
use crate::creation::{BrowserCreationController, BrowserKind, BrowserLifecycleState, CreationOutcome};
use crate::dispatch::{HostDispatcher, HostRequest};
use crate::drag::{Capability, DragOperations, Unsupported};
use crate::engine::{BrowserId, CursorType, NativeEngine, WindowHandle};
use crate::geometry::{DirtyRect, Point, PopupRect, Rect, ScreenPoint, ViewGeometry, ViewRect};
use crate::handle::{NativeSurface, WindowHandleResolver};
use crate::input::{InputEventSource, InputEventTranslator, NoOverlays, OverlayDismisser};
use crate::pixels::{Layer, PixelBuffer};
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, trace, warn};

/// Callbacks the native engine drives on its own thread
pub trait RenderHandler: Send + Sync {
    /// Current view bounds, used by the engine to size its buffer
    fn view_rect(&self) -> ViewRect;

    /// Translate a view point to screen coordinates (popups, IME)
    fn screen_point(&self, view_point: Point) -> ScreenPoint;

    fn on_popup_show(&self, show: bool);

    fn on_popup_size(&self, rect: PopupRect);

    /// New pixels for the base or popup layer. `buffer` is only valid for
    /// the duration of the call.
    fn on_paint(
        &self,
        is_popup: bool,
        dirty_regions: &[DirtyRect],
        buffer: &[u8],
        width: u32,
        height: u32,
    );

    fn on_cursor_change(&self, cursor: CursorType);

    fn start_dragging(
        &self,
        allowed_ops: DragOperations,
        x: i32,
        y: i32,
    ) -> Result<(), Unsupported>;

    fn update_drag_cursor(&self, operation: DragOperations) -> Result<(), Unsupported>;

    /// The engine created the browser
    fn on_after_created(&self, browser: BrowserId);
}

/// Assembles an [`OsrBrowser`]
pub struct OsrBrowserBuilder<B: TextureBackend> {
    config: OsrConfig,
    engine: Arc<dyn NativeEngine>,
    surface: Arc<dyn NativeSurface>,
    backend: B,
    dispatcher: Arc<dyn HostDispatcher>,
    overlays: Arc<dyn OverlayDismisser>,
    kind: Option<BrowserKind>,
}

impl<B: TextureBackend> OsrBrowserBuilder<B> {
    pub fn new(
        config: OsrConfig,
        engine: Arc<dyn NativeEngine>,
        surface: Arc<dyn NativeSurface>,
        backend: B,
        dispatcher: Arc<dyn HostDispatcher>,
    ) -> Self {
        Self {
            config,
            engine,
            surface,
            backend,
            dispatcher,
            overlays: Arc::new(NoOverlays),
            kind: None,
        }
    }

    /// Host hook that closes menus before the browser takes focus
    pub fn overlays(mut self, overlays: Arc<dyn OverlayDismisser>) -> Self {
        self.overlays = overlays;
        self
    }

    /// Create DevTools for `parent` instead of loading the start URL
    pub fn dev_tools_of(mut self, parent: BrowserId, inspect_at: Option<Point>) -> Self {
        self.kind = Some(BrowserKind::DevTools { parent, inspect_at });
        self
    }

    pub fn build(self) -> Arc<OsrBrowser<B>> {
        let kind = self.kind.unwrap_or_else(|| BrowserKind::Page {
            url: self.config.start_url.clone(),
            request_context: self.config.request_context.clone(),
        });
        let transparent = self.config.transparent;

        let resolver = Arc::new(WindowHandleResolver::new(self.surface, self.engine.clone()));
        let controller = Arc::new(BrowserCreationController::new(
            resolver.clone(),
            self.engine.clone(),
            kind,
            transparent,
        ));
        let input = Arc::new(InputEventTranslator::new(
            controller.clone(),
            self.engine.clone(),
            self.overlays,
        ));
        let compositor =
            FrameCompositor::new(self.backend, self.config.compositor.clone(), transparent);

        Arc::new(OsrBrowser {
            config: self.config,
            resolver,
            controller,
            compositor,
            input,
            geometry: ArcSwap::from_pointee(ViewGeometry::INITIAL),
            engine: self.engine,
            dispatcher: self.dispatcher,
            browser_id: OnceLock::new(),
            disposed: AtomicBool::new(false),
        })
    }
}

/// One off-screen browser bound to one host surface
pub struct OsrBrowser<B: TextureBackend> {
    config: OsrConfig,
    resolver: Arc<WindowHandleResolver>,
    controller: Arc<BrowserCreationController>,
    compositor: FrameCompositor<B>,
    input: Arc<InputEventTranslator>,
    geometry: ArcSwap<ViewGeometry>,
    engine: Arc<dyn NativeEngine>,
    dispatcher: Arc<dyn HostDispatcher>,
    browser_id: OnceLock<BrowserId>,
    disposed: AtomicBool,
}

impl<B: TextureBackend> OsrBrowser<B> {
    /// Surface init: create compositor resources
    pub fn init(&self) {
        match self.compositor.init() {
            Ok(()) => {}
            Err(CompositorError::Disposed) => debug!("init after dispose ignored"),
            Err(e) => warn!("Compositor init failed, will retry: {}", e),
        }
    }

    /// Surface reshape: publish new bounds and tell the engine.
    ///
    /// Zero extents are clamped to 1 so the engine never sees an empty view.
    pub fn reshape(&self, x: i32, y: i32, width: u32, height: u32) {
        if self.is_disposed() {
            return;
        }
        let (width, height) = (width.max(1), height.max(1));

        let origin = self.resolver.surface().location_on_screen();
        let view_rect = Rect::new(x, y, width, height);
        self.geometry.rcu(|current| ViewGeometry {
            view_rect,
            screen_origin: origin.unwrap_or(current.screen_origin),
        });
        debug!("Surface reshaped to {}", view_rect);

        // Races with paint-triggered creation; resolution is idempotent.
        self.resolver.resolve();
        self.engine.notify_view_size_changed(width, height);
    }

    /// The surface moved on screen without changing size
    pub fn relocate(&self, screen_origin: ScreenPoint) {
        self.geometry.rcu(|current| ViewGeometry {
            view_rect: current.view_rect,
            screen_origin,
        });
    }

    /// Surface display: create the browser if needed, then composite
    pub fn display(&self) {
        if self.is_disposed() {
            return;
        }

        if self.controller.state() == BrowserLifecycleState::Unbound {
            let outcome = self.controller.request_creation(true);
            trace!("Creation trigger from display: {:?}", outcome);
        }

        let view = self.geometry.load().view_rect;
        match self.compositor.composite(view) {
            Ok(()) => {}
            Err(CompositorError::NotInitialized) => debug!("display before init, frame skipped"),
            Err(CompositorError::Disposed) => {}
            Err(e) => warn!("Frame dropped: {}", e),
        }
    }

    /// Surface dispose: release GPU resources. Later callbacks are no-ops.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.compositor.dispose();
        info!("Off-screen browser disposed");
    }

    /// Create the browser now, without binding it to the window handle
    pub fn create_immediately(&self) -> CreationOutcome {
        self.controller.request_creation(false)
    }

    /// Hook a host input source up to this browser
    pub fn attach_input(&self, source: &mut dyn InputEventSource) {
        source.attach(self.input.clone());
    }

    /// Bridge for a DevTools window inspecting this browser.
    ///
    /// `None` until this browser is bound.
    pub fn dev_tools<D: TextureBackend>(
        &self,
        surface: Arc<dyn NativeSurface>,
        backend: D,
        dispatcher: Arc<dyn HostDispatcher>,
        inspect_at: Option<Point>,
    ) -> Option<Arc<OsrBrowser<D>>> {
        let parent = *self.browser_id.get()?;
        Some(
            OsrBrowserBuilder::new(
                self.config.clone(),
                self.engine.clone(),
                surface,
                backend,
                dispatcher,
            )
            .dev_tools_of(parent, inspect_at)
            .build(),
        )
    }

    pub fn state(&self) -> BrowserLifecycleState {
        self.controller.state()
    }

    pub fn browser_id(&self) -> Option<BrowserId> {
        self.browser_id.get().copied()
    }

    pub fn window_handle(&self) -> WindowHandle {
        self.resolver.cached()
    }

    pub fn view_geometry(&self) -> ViewGeometry {
        **self.geometry.load()
    }

    pub fn input(&self) -> &Arc<InputEventTranslator> {
        &self.input
    }

    pub fn compositor(&self) -> &FrameCompositor<B> {
        &self.compositor
    }

    pub fn config(&self) -> &OsrConfig {
        &self.config
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl<B: TextureBackend> RenderHandler for OsrBrowser<B> {
    fn view_rect(&self) -> ViewRect {
        self.geometry.load().view_rect
    }

    fn screen_point(&self, view_point: Point) -> ScreenPoint {
        self.geometry.load().to_screen(view_point)
    }

    fn on_popup_show(&self, show: bool) {
        if show || self.is_disposed() {
            return;
        }
        self.compositor.clear_popup();
        self.dispatcher.dispatch(HostRequest::Redraw);
    }

    fn on_popup_size(&self, rect: PopupRect) {
        self.compositor.on_popup_size(rect);
    }

    fn on_paint(
        &self,
        is_popup: bool,
        dirty_regions: &[DirtyRect],
        buffer: &[u8],
        width: u32,
        height: u32,
    ) {
        if self.is_disposed() {
            trace!("Paint after dispose dropped");
            return;
        }

        let pixels = match PixelBuffer::new(buffer.to_vec(), width, height) {
            Ok(pixels) => pixels,
            Err(e) => {
                warn!("Dropping paint: {}", e);
                return;
            }
        };

        let layer = Layer::from_popup_flag(is_popup);
        match self.compositor.on_paint(layer, dirty_regions, &pixels) {
            Ok(outcome) if outcome.needs_redraw() => {
                self.dispatcher.dispatch(HostRequest::Redraw);
            }
            Ok(_) => {}
            Err(CompositorError::NotInitialized) => {
                debug!("Paint before compositor init, frame dropped");
            }
            Err(e) => warn!("Paint dropped: {}", e),
        }
    }

    fn on_cursor_change(&self, cursor: CursorType) {
        if self.is_disposed() {
            return;
        }
        self.dispatcher.dispatch(HostRequest::SetCursor(cursor));
    }

    fn start_dragging(
        &self,
        _allowed_ops: DragOperations,
        _x: i32,
        _y: i32,
    ) -> Result<(), Unsupported> {
        Err(Unsupported(Capability::DragAndDrop))
    }

    fn update_drag_cursor(&self, _operation: DragOperations) -> Result<(), Unsupported> {
        Err(Unsupported(Capability::DragAndDrop))
    }

    fn on_after_created(&self, browser: BrowserId) {
        // Only a creation that is actually in flight may bind the id.
        if !self.controller.on_native_ready() {
            warn!("Ignoring unexpected creation notification for {}", browser);
            return;
        }
        if self.browser_id.set(browser).is_err() {
            warn!("Duplicate creation notification for {}", browser);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{ChannelDispatcher, HostRequests};
    use crate::engine::{CreateBrowserParams, CreateDevToolsParams};
    use crate::input::{InputDisposition, InputSink, PointerEvent, PointerEventKind};
    use crate::mock::{EngineCall, MockEngine, MockSurface, TEST_URL};
    use crate::software::SoftwareBackend;
    use proptest::prelude::*;
    use std::thread;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const RED: [u8; 4] = [0, 0, 255, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];

    struct Harness {
        browser: Arc<OsrBrowser<SoftwareBackend>>,
        engine: Arc<MockEngine>,
        surface: Arc<MockSurface>,
        requests: HostRequests,
    }

    fn harness_with(surface: MockSurface) -> Harness {
        let engine = Arc::new(MockEngine::new());
        let surface = Arc::new(surface);
        let (dispatcher, requests) = ChannelDispatcher::new();
        let config = OsrConfig {
            start_url: TEST_URL.to_string(),
            ..OsrConfig::default()
        };
        let browser = OsrBrowserBuilder::new(
            config,
            engine.clone(),
            surface.clone(),
            SoftwareBackend::new(),
            Arc::new(dispatcher),
        )
        .build();
        Harness {
            browser,
            engine,
            surface,
            requests,
        }
    }

    fn harness() -> Harness {
        harness_with(MockSurface::realized(0xbeef))
    }

    fn filled(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
        PixelBuffer::filled(width, height, px).bytes().to_vec()
    }

    #[test]
    fn test_end_to_end_creation_and_resize() {
        let h = harness();
        h.surface.set_location(Point::new(30, 40));

        h.browser.init();
        h.browser.reshape(0, 0, 800, 600);
        h.browser.display();

        assert_eq!(
            h.engine.created(),
            vec![CreateBrowserParams {
                window_handle: WindowHandle(0xbeef),
                url: TEST_URL.to_string(),
                transparent: false,
                request_context: None,
            }]
        );
        assert_eq!(h.browser.state(), BrowserLifecycleState::Creating);

        h.browser.on_after_created(BrowserId(1));
        assert_eq!(h.browser.state(), BrowserLifecycleState::Bound);

        h.browser.reshape(0, 0, 400, 300);
        h.browser.display();

        assert_eq!(h.engine.resizes(), vec![(800, 600), (400, 300)]);
        assert_eq!(h.engine.created().len(), 1);
        assert_eq!(h.browser.view_rect(), Rect::from_size(400, 300));
        assert_eq!(h.browser.screen_point(Point::new(5, 5)), Point::new(35, 45));
    }

    #[test]
    fn test_display_retries_creation_until_realized() {
        let h = harness_with(MockSurface::unrealized());
        h.browser.init();

        h.browser.display();
        h.browser.display();
        assert!(h.engine.created().is_empty());
        assert_eq!(h.browser.state(), BrowserLifecycleState::Unbound);

        h.surface.realize(0x42);
        h.browser.display();
        assert_eq!(h.engine.created().len(), 1);
        assert_eq!(h.browser.window_handle(), WindowHandle(0x42));
    }

    #[test]
    fn test_display_while_creating_does_not_recreate() {
        let h = harness();
        h.browser.init();
        h.browser.display();
        h.browser.display();
        assert_eq!(h.engine.created().len(), 1);
        assert_eq!(h.engine.count(|c| *c == EngineCall::SetFocus(true)), 0);
    }

    #[test]
    fn test_paint_schedules_redraw_and_composites() {
        let h = harness();
        h.browser.init();
        h.browser.reshape(0, 0, 8, 8);

        h.browser
            .on_paint(false, &[Rect::from_size(8, 8)], &filled(8, 8, RED), 8, 8);
        assert_eq!(h.requests.drain(), vec![HostRequest::Redraw]);

        h.browser.display();
        h.browser.compositor().with_backend(|b| {
            assert_eq!(b.framebuffer_pixel(0, 0), Some(RED));
            assert_eq!(b.framebuffer_pixel(7, 7), Some(RED));
        });
    }

    #[test]
    fn test_paint_from_engine_thread() {
        let h = harness();
        h.browser.init();
        h.browser.reshape(0, 0, 4, 4);

        let browser = h.browser.clone();
        thread::spawn(move || {
            browser.on_paint(false, &[Rect::from_size(4, 4)], &filled(4, 4, GREEN), 4, 4);
        })
        .join()
        .unwrap();

        let redraw = h.requests.receiver().recv_timeout(std::time::Duration::from_secs(1));
        assert_eq!(redraw, Ok(HostRequest::Redraw));
    }

    #[test]
    fn test_paint_before_init_is_dropped() {
        let h = harness();
        h.browser
            .on_paint(false, &[Rect::from_size(2, 2)], &filled(2, 2, RED), 2, 2);
        assert!(h.requests.drain().is_empty());
    }

    #[test]
    fn test_mismatched_buffer_is_dropped() {
        let h = harness();
        h.browser.init();
        h.browser.on_paint(false, &[Rect::from_size(4, 4)], &[0u8; 12], 4, 4);
        assert!(h.requests.drain().is_empty());
        h.browser
            .compositor()
            .with_backend(|b| assert_eq!(b.layer_size(Layer::Base), None));
    }

    #[test]
    fn test_popup_hide_clears_and_redraws() {
        let h = harness();
        h.browser.init();
        h.browser.reshape(0, 0, 10, 10);
        h.browser
            .on_paint(false, &[Rect::from_size(10, 10)], &filled(10, 10, RED), 10, 10);

        h.browser.on_popup_show(true);
        h.browser.on_popup_size(Rect::new(2, 2, 3, 3));
        h.browser
            .on_paint(true, &[Rect::from_size(3, 3)], &filled(3, 3, GREEN), 3, 3);
        h.browser.display();
        h.browser
            .compositor()
            .with_backend(|b| assert_eq!(b.framebuffer_pixel(3, 3), Some(GREEN)));
        h.requests.drain();

        h.browser.on_popup_show(false);
        assert_eq!(h.requests.drain(), vec![HostRequest::Redraw]);
        h.browser.display();
        h.browser
            .compositor()
            .with_backend(|b| assert_eq!(b.framebuffer_pixel(3, 3), Some(RED)));
    }

    #[test]
    fn test_uncovered_area_uses_clear_color() {
        let h = harness();
        h.browser.init();
        h.browser.reshape(0, 0, 6, 6);
        h.browser
            .on_paint(false, &[Rect::from_size(4, 4)], &filled(4, 4, RED), 4, 4);
        h.browser.display();
        h.browser.compositor().with_backend(|b| {
            assert_eq!(b.framebuffer_pixel(3, 3), Some(RED));
            assert_eq!(b.framebuffer_pixel(5, 5), Some(WHITE));
        });
    }

    #[test]
    fn test_cursor_change_handed_to_ui() {
        let h = harness();
        h.browser.on_cursor_change(CursorType::Hand);
        assert_eq!(
            h.requests.drain(),
            vec![HostRequest::SetCursor(CursorType::Hand)]
        );
    }

    #[test]
    fn test_callbacks_after_dispose_are_noops() {
        let h = harness();
        h.browser.init();
        h.browser.dispose();
        h.browser.dispose();

        h.browser
            .on_paint(false, &[Rect::from_size(2, 2)], &filled(2, 2, RED), 2, 2);
        h.browser.on_cursor_change(CursorType::Text);
        h.browser.on_popup_show(false);
        h.browser.display();
        h.browser.reshape(0, 0, 10, 10);

        assert!(h.requests.drain().is_empty());
        assert!(h.engine.created().is_empty());
        assert!(h.engine.resizes().is_empty());
        h.browser
            .compositor()
            .with_backend(|b| assert_eq!(b.dispose_count(), 1));
    }

    #[test]
    fn test_dispose_without_init() {
        let h = harness();
        h.browser.dispose();
        assert!(h.browser.is_disposed());
        h.browser.init();
        assert!(!h.browser.compositor().is_initialized());
    }

    #[test]
    fn test_input_gated_by_creation() {
        let h = harness();
        let click = PointerEvent::new(PointerEventKind::Clicked, 1, 1);
        let input = h.browser.input().clone();

        assert_eq!(input.send_pointer_event(click), InputDisposition::Dropped);
        h.browser.init();
        h.browser.display();
        h.browser.on_after_created(BrowserId(3));
        assert_eq!(input.send_pointer_event(click), InputDisposition::Forwarded);

        assert_eq!(h.engine.count(|c| *c == EngineCall::Pointer(click)), 1);
    }

    #[test]
    fn test_attach_input_source() {
        struct Source(Option<Arc<dyn InputSink>>);
        impl InputEventSource for Source {
            fn attach(&mut self, sink: Arc<dyn InputSink>) {
                self.0 = Some(sink);
            }
        }

        let h = harness();
        let mut source = Source(None);
        h.browser.attach_input(&mut source);
        assert!(source.0.is_some());
    }

    #[test]
    fn test_drag_is_explicitly_unsupported() {
        let h = harness();
        assert_eq!(
            h.browser.start_dragging(DragOperations::COPY, 1, 1),
            Err(Unsupported(Capability::DragAndDrop))
        );
        assert_eq!(
            h.browser.update_drag_cursor(DragOperations::MOVE),
            Err(Unsupported(Capability::DragAndDrop))
        );
    }

    #[test]
    fn test_create_immediately_uses_null_handle() {
        let h = harness_with(MockSurface::unrealized());
        assert_eq!(h.browser.create_immediately(), CreationOutcome::Requested);
        assert_eq!(h.engine.created()[0].window_handle, WindowHandle::NULL);
    }

    #[test]
    fn test_dev_tools_inherit_transparency() {
        let engine = Arc::new(MockEngine::new());
        let (dispatcher, _requests) = ChannelDispatcher::new();
        let dispatcher: Arc<dyn HostDispatcher> = Arc::new(dispatcher);
        let config = OsrConfig {
            transparent: true,
            ..OsrConfig::default()
        };
        let parent = OsrBrowserBuilder::new(
            config,
            engine.clone(),
            Arc::new(MockSurface::realized(1)),
            SoftwareBackend::new(),
            dispatcher.clone(),
        )
        .build();

        let devtools_surface: Arc<dyn NativeSurface> = Arc::new(MockSurface::realized(2));
        assert!(
            parent
                .dev_tools(devtools_surface.clone(), SoftwareBackend::new(), dispatcher.clone(), None)
                .is_none()
        );

        parent.create_immediately();
        parent.on_after_created(BrowserId(7));
        let devtools = parent
            .dev_tools(
                devtools_surface,
                SoftwareBackend::new(),
                dispatcher,
                Some(Point::new(4, 4)),
            )
            .unwrap();
        devtools.init();
        devtools.display();

        assert_eq!(
            engine.calls().last(),
            Some(&EngineCall::CreateDevTools(CreateDevToolsParams {
                parent: BrowserId(7),
                window_handle: WindowHandle(2),
                transparent: true,
                inspect_at: Some(Point::new(4, 4)),
            }))
        );
    }

    #[test]
    fn test_relocate_keeps_view_rect() {
        let h = harness();
        h.browser.reshape(0, 0, 100, 50);
        h.browser.relocate(Point::new(200, 300));
        assert_eq!(
            h.browser.view_geometry(),
            ViewGeometry {
                view_rect: Rect::from_size(100, 50),
                screen_origin: Point::new(200, 300),
            }
        );
    }

    #[test]
    fn test_stray_creation_notification_ignored() {
        let h = harness();
        h.browser.init();

        h.browser.on_after_created(BrowserId(1));
        assert_eq!(h.browser.state(), BrowserLifecycleState::Unbound);
        assert_eq!(h.browser.browser_id(), None);

        h.browser.display();
        assert_eq!(h.browser.state(), BrowserLifecycleState::Creating);
        h.browser.on_after_created(BrowserId(2));

        assert_eq!(h.browser.state(), BrowserLifecycleState::Bound);
        assert_eq!(h.browser.browser_id(), Some(BrowserId(2)));
    }

    #[test]
    fn test_stray_notification_does_not_enable_dev_tools() {
        let h = harness();
        h.browser.on_after_created(BrowserId(1));
        let (dispatcher, _requests) = ChannelDispatcher::new();
        let devtools = h.browser.dev_tools(
            Arc::new(MockSurface::realized(2)),
            SoftwareBackend::new(),
            Arc::new(dispatcher),
            None,
        );
        assert!(devtools.is_none());
    }

    #[test]
    fn test_zero_size_reshape_is_clamped() {
        let h = harness();
        h.browser.reshape(0, 0, 0, 300);
        h.browser.reshape(0, 0, 640, 0);

        assert_eq!(h.engine.resizes(), vec![(1, 300), (640, 1)]);
        assert_eq!(h.browser.view_rect(), Rect::from_size(640, 1));
    }

    #[test]
    fn test_initial_view_rect() {
        let h = harness();
        assert_eq!(h.browser.view_rect(), Rect::new(0, 0, 1, 1));
    }

    proptest! {
        #[test]
        fn prop_reshape_sequence(sizes in prop::collection::vec((1u32..4096, 1u32..4096), 1..20)) {
            let h = harness();
            for &(width, height) in &sizes {
                h.browser.reshape(0, 0, width, height);
            }

            let last = *sizes.last().unwrap();
            prop_assert_eq!(h.browser.view_rect(), Rect::from_size(last.0, last.1));
            prop_assert_eq!(h.engine.resizes(), sizes);
        }
    }
}
