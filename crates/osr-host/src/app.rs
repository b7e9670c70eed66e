//! Host Application - winit event loop around one off-screen browser
//!
//! The engine paints on its own thread; its redraw and cursor requests come
//! back into this loop as user events through an [`EventLoopProxy`].

use crate::config::HostConfig;
use crate::input::WinitInput;
use crate::pattern::TestPatternEngine;
use crate::surface::WinitSurface;
use anyhow::{Context, Result};
use osr_bridge::{CursorType, HostDispatcher, HostRequest, OsrBrowser, OsrBrowserBuilder, Point};
use osr_render::{GpuContext, RenderSurface, SurfaceConfig, WgpuBackend, default_instance};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{CursorIcon, Window, WindowAttributes, WindowId};

/// Posts bridge requests into the winit event loop
pub struct ProxyDispatcher {
    proxy: Mutex<EventLoopProxy<HostRequest>>,
}

impl ProxyDispatcher {
    pub fn new(proxy: EventLoopProxy<HostRequest>) -> Self {
        Self {
            proxy: Mutex::new(proxy),
        }
    }
}

impl HostDispatcher for ProxyDispatcher {
    fn dispatch(&self, request: HostRequest) {
        let proxy = self.proxy.lock().unwrap_or_else(PoisonError::into_inner);
        if proxy.send_event(request).is_err() {
            debug!("Event loop closed, dropping {:?}", request);
        }
    }
}

pub fn cursor_icon(cursor: CursorType) -> CursorIcon {
    match cursor {
        CursorType::Default | CursorType::Custom(_) => CursorIcon::Default,
        CursorType::Crosshair => CursorIcon::Crosshair,
        CursorType::Text => CursorIcon::Text,
        CursorType::Wait => CursorIcon::Wait,
        CursorType::Hand => CursorIcon::Pointer,
        CursorType::Move => CursorIcon::Move,
        CursorType::ResizeNorth => CursorIcon::NResize,
        CursorType::ResizeSouth => CursorIcon::SResize,
        CursorType::ResizeEast => CursorIcon::EResize,
        CursorType::ResizeWest => CursorIcon::WResize,
        CursorType::ResizeNorthEast => CursorIcon::NeResize,
        CursorType::ResizeNorthWest => CursorIcon::NwResize,
        CursorType::ResizeSouthEast => CursorIcon::SeResize,
        CursorType::ResizeSouthWest => CursorIcon::SwResize,
    }
}

struct Session {
    window: Arc<Window>,
    browser: Arc<OsrBrowser<WgpuBackend>>,
    engine: Arc<TestPatternEngine>,
}

/// winit application hosting one off-screen browser
pub struct OsrHostApp {
    config: HostConfig,
    proxy: EventLoopProxy<HostRequest>,
    input: WinitInput,
    session: Option<Session>,
}

impl OsrHostApp {
    pub fn new(config: HostConfig, proxy: EventLoopProxy<HostRequest>) -> Self {
        Self {
            config,
            proxy,
            input: WinitInput::new(),
            session: None,
        }
    }

    fn start_session(&mut self, event_loop: &ActiveEventLoop) -> Result<Session> {
        let settings = &self.config.window;
        let attrs = WindowAttributes::default()
            .with_title(settings.title.clone())
            .with_inner_size(LogicalSize::new(settings.width, settings.height))
            .with_transparent(self.config.browser.transparent);
        let window = Arc::new(event_loop.create_window(attrs).context("Failed to create window")?);
        info!("Window created");

        let instance = default_instance();
        let wgpu_surface = instance
            .create_surface(window.clone())
            .context("Failed to create wgpu surface")?;
        let gpu = pollster::block_on(GpuContext::new(
            instance,
            Some(&wgpu_surface),
            self.config.gpu.clone(),
        ))?;

        let size = window.inner_size();
        let render_surface = RenderSurface::new(
            &gpu,
            wgpu_surface,
            SurfaceConfig {
                width: size.width,
                height: size.height,
                vsync: self.config.gpu.vsync,
                transparent: self.config.browser.transparent,
            },
        )?;
        let backend = WgpuBackend::new(&gpu, render_surface);

        let engine = Arc::new(TestPatternEngine::new());
        let browser = OsrBrowserBuilder::new(
            self.config.browser.clone(),
            engine.clone(),
            Arc::new(WinitSurface::new(window.clone())),
            backend,
            Arc::new(ProxyDispatcher::new(self.proxy.clone())),
        )
        .build();

        let handler: Weak<OsrBrowser<WgpuBackend>> = Arc::downgrade(&browser);
        engine.attach(handler);
        browser.attach_input(&mut self.input);

        browser.init();
        browser.reshape(0, 0, size.width.max(1), size.height.max(1));
        window.request_redraw();

        Ok(Session {
            window,
            browser,
            engine,
        })
    }

    fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            session.browser.dispose();
            session.engine.shutdown();
        }
    }
}

impl ApplicationHandler<HostRequest> for OsrHostApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }

        match self.start_session(event_loop) {
            Ok(session) => {
                info!("Off-screen browser ready");
                self.session = Some(session);
            }
            Err(e) => {
                error!("Failed to start: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(session) = &self.session else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                info!("Window close requested");
                self.shutdown();
                event_loop.exit();
            }

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if width > 0 && height > 0 {
                    debug!("Window resized: {}x{}", width, height);
                    session.browser.reshape(0, 0, width, height);
                    session.window.request_redraw();
                }
            }

            WindowEvent::Moved(position) => {
                if let Ok(inner) = session.window.inner_position() {
                    session.browser.relocate(Point::new(inner.x, inner.y));
                } else {
                    session.browser.relocate(Point::new(position.x, position.y));
                }
            }

            WindowEvent::RedrawRequested => {
                session.browser.display();
            }

            other => {
                self.input.handle_window_event(&other);
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, request: HostRequest) {
        let Some(session) = &self.session else {
            return;
        };

        match request {
            HostRequest::Redraw => session.window.request_redraw(),
            HostRequest::SetCursor(cursor) => session.window.set_cursor(cursor_icon(cursor)),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Run the host until its window closes
pub fn run(config: HostConfig) -> Result<()> {
    info!("Starting OSR host");

    let event_loop = EventLoop::<HostRequest>::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = OsrHostApp::new(config, event_loop.create_proxy());
    event_loop.run_app(&mut app)?;

    Ok(())
}
