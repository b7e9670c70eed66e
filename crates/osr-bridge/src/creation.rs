//! Lazy browser creation.
//!
//! The browser is created on the first real paint attempt rather than at
//! construction time: before the host surface is realized there is no window
//! handle to bind to, and a browser created against a null handle is useless.

use crate::engine::{
    BrowserId, CreateBrowserParams, CreateDevToolsParams, NativeEngine, WindowHandle,
};
use crate::geometry::Point;
use crate::handle::WindowHandleResolver;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{debug, info, warn};

/// Lifecycle of the single browser this bridge owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BrowserLifecycleState {
    Unbound = 0,
    Creating = 1,
    Bound = 2,
}

impl BrowserLifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Unbound,
            1 => Self::Creating,
            _ => Self::Bound,
        }
    }
}

impl fmt::Display for BrowserLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => write!(f, "unbound"),
            Self::Creating => write!(f, "creating"),
            Self::Bound => write!(f, "bound"),
        }
    }
}

/// What kind of browser this bridge creates
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserKind {
    /// A regular page browser
    Page {
        url: String,
        request_context: Option<String>,
    },
    /// DevTools attached to an existing browser
    DevTools {
        parent: BrowserId,
        inspect_at: Option<Point>,
    },
}

/// Result of a creation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationOutcome {
    /// The engine was asked to create the browser
    Requested,
    /// No window handle yet; the next trigger retries
    Deferred,
    /// The engine refused; the next trigger retries
    Rejected,
    /// A creation is already in flight
    InFlight,
    /// Browser already bound; focus was requested instead
    Focused,
}

/// Gates browser creation and its one-time binding to the window handle
pub struct BrowserCreationController {
    state: AtomicU8,
    resolver: Arc<WindowHandleResolver>,
    engine: Arc<dyn NativeEngine>,
    kind: BrowserKind,
    transparent: bool,
}

impl BrowserCreationController {
    pub fn new(
        resolver: Arc<WindowHandleResolver>,
        engine: Arc<dyn NativeEngine>,
        kind: BrowserKind,
        transparent: bool,
    ) -> Self {
        Self {
            state: AtomicU8::new(BrowserLifecycleState::Unbound as u8),
            resolver,
            engine,
            kind,
            transparent,
        }
    }

    pub fn state(&self) -> BrowserLifecycleState {
        BrowserLifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_bound(&self) -> bool {
        self.state() == BrowserLifecycleState::Bound
    }

    pub fn kind(&self) -> &BrowserKind {
        &self.kind
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Ask the engine to create the browser.
    ///
    /// Only acts from `Unbound`. A bound browser cannot be rebound, so a
    /// late request from an overlapping trigger turns into a focus request.
    pub fn request_creation(&self, needs_window_binding: bool) -> CreationOutcome {
        if let Err(current) = self.state.compare_exchange(
            BrowserLifecycleState::Unbound as u8,
            BrowserLifecycleState::Creating as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            return match BrowserLifecycleState::from_u8(current) {
                BrowserLifecycleState::Bound => {
                    debug!("Browser already bound, requesting focus");
                    self.engine.set_focus(true);
                    CreationOutcome::Focused
                }
                _ => {
                    debug!("Browser creation already in flight");
                    CreationOutcome::InFlight
                }
            };
        }

        let window_handle = if needs_window_binding {
            let handle = self.resolver.resolve();
            if handle.is_null() {
                debug!("Window handle not available yet, deferring browser creation");
                self.revert_to_unbound();
                return CreationOutcome::Deferred;
            }
            handle
        } else {
            WindowHandle::NULL
        };

        let result = match &self.kind {
            BrowserKind::Page {
                url,
                request_context,
            } => {
                info!("Creating browser for {} (handle {})", url, window_handle);
                self.engine.create_browser(CreateBrowserParams {
                    window_handle,
                    url: url.clone(),
                    transparent: self.transparent,
                    request_context: request_context.clone(),
                })
            }
            BrowserKind::DevTools { parent, inspect_at } => {
                info!("Creating DevTools for {} (handle {})", parent, window_handle);
                self.engine.create_dev_tools(CreateDevToolsParams {
                    parent: *parent,
                    window_handle,
                    transparent: self.transparent,
                    inspect_at: *inspect_at,
                })
            }
        };

        match result {
            Ok(()) => CreationOutcome::Requested,
            Err(e) => {
                warn!("Browser creation failed: {}", e);
                self.revert_to_unbound();
                CreationOutcome::Rejected
            }
        }
    }

    /// The engine confirmed the browser exists
    pub fn on_native_ready(&self) -> bool {
        match self.state.compare_exchange(
            BrowserLifecycleState::Creating as u8,
            BrowserLifecycleState::Bound as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                info!("Browser bound");
                true
            }
            Err(current) => {
                warn!(
                    "Ignoring native-ready notification in state {}",
                    BrowserLifecycleState::from_u8(current)
                );
                false
            }
        }
    }

    fn revert_to_unbound(&self) {
        // Only the thread that won Unbound -> Creating gets here, but the
        // engine may already have confirmed creation in the meantime.
        let _ = self.state.compare_exchange(
            BrowserLifecycleState::Creating as u8,
            BrowserLifecycleState::Unbound as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}
