//! Host input forwarding.
//!
//! Input is a live stream: anything that arrives before the browser is bound
//! is dropped, since replaying a stale pointer position later would be worse
//! than losing it.

use crate::creation::BrowserCreationController;
use crate::engine::NativeEngine;
use bitflags::bitflags;
use std::sync::Arc;
use tracing::{debug, trace};

bitflags! {
    /// Modifier keys held while an event was generated
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
        const LEFT_BUTTON = 1 << 4;
        const MIDDLE_BUTTON = 1 << 5;
        const RIGHT_BUTTON = 1 << 6;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Pressed,
    Released,
    Clicked,
    Moved,
    Dragged,
    Entered,
    Exited,
}

/// Pointer event in surface-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub x: i32,
    pub y: i32,
    pub button: Option<MouseButton>,
    pub click_count: u32,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, x: i32, y: i32) -> Self {
        Self {
            kind,
            x,
            y,
            button: None,
            click_count: 0,
            modifiers: Modifiers::empty(),
        }
    }

    pub fn with_button(mut self, button: MouseButton, click_count: u32) -> Self {
        self.button = Some(button);
        self.click_count = click_count;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Wheel event; deltas are in pixels, positive y scrolls down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub x: i32,
    pub y: i32,
    pub delta_x: f32,
    pub delta_y: f32,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Pressed,
    Released,
    Typed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    /// Platform-independent key code
    pub key_code: u32,
    /// Character produced, for `Typed` events
    pub character: Option<char>,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusEvent {
    Gained,
    Lost,
}

/// Any host input event the bridge understands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Wheel(WheelEvent),
    Key(KeyEvent),
    Focus(FocusEvent),
}

/// What happened to a handled event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDisposition {
    Forwarded,
    Dropped,
}

/// Receiver of host input, independent of any windowing library
pub trait InputSink: Send + Sync {
    fn handle_input(&self, event: InputEvent) -> InputDisposition;
}

/// A host toolkit component that can deliver input to a sink.
///
/// Implemented by the host; the bridge only calls `attach`.
pub trait InputEventSource {
    fn attach(&mut self, sink: Arc<dyn InputSink>);
}

/// Dismisses host transient overlays (open menus, tooltips)
pub trait OverlayDismisser: Send + Sync {
    fn dismiss_transient_overlays(&self);
}

/// Dismisser for hosts without transient overlays
#[derive(Debug, Default)]
pub struct NoOverlays;

impl OverlayDismisser for NoOverlays {
    fn dismiss_transient_overlays(&self) {}
}

/// Forwards host input to the engine once a browser is bound
pub struct InputEventTranslator {
    controller: Arc<BrowserCreationController>,
    engine: Arc<dyn NativeEngine>,
    overlays: Arc<dyn OverlayDismisser>,
}

impl InputEventTranslator {
    pub fn new(
        controller: Arc<BrowserCreationController>,
        engine: Arc<dyn NativeEngine>,
        overlays: Arc<dyn OverlayDismisser>,
    ) -> Self {
        Self {
            controller,
            engine,
            overlays,
        }
    }

    pub fn send_pointer_event(&self, event: PointerEvent) -> InputDisposition {
        self.handle_input(InputEvent::Pointer(event))
    }

    pub fn send_wheel_event(&self, event: WheelEvent) -> InputDisposition {
        self.handle_input(InputEvent::Wheel(event))
    }

    pub fn send_key_event(&self, event: KeyEvent) -> InputDisposition {
        self.handle_input(InputEvent::Key(event))
    }

    pub fn focus_gained(&self) -> InputDisposition {
        self.handle_input(InputEvent::Focus(FocusEvent::Gained))
    }

    pub fn focus_lost(&self) -> InputDisposition {
        self.handle_input(InputEvent::Focus(FocusEvent::Lost))
    }
}

impl InputSink for InputEventTranslator {
    fn handle_input(&self, event: InputEvent) -> InputDisposition {
        if !self.controller.is_bound() {
            trace!("Dropping {:?} before browser is bound", event);
            return InputDisposition::Dropped;
        }

        match event {
            InputEvent::Pointer(ref pointer) => self.engine.send_pointer_event(pointer),
            InputEvent::Wheel(ref wheel) => self.engine.send_wheel_event(wheel),
            InputEvent::Key(ref key) => self.engine.send_key_event(key),
            InputEvent::Focus(FocusEvent::Gained) => {
                // The browser must not take keyboard focus under a visible menu.
                self.overlays.dismiss_transient_overlays();
                debug!("Focus gained");
                self.engine.set_focus(true);
            }
            InputEvent::Focus(FocusEvent::Lost) => {
                debug!("Focus lost");
                self.engine.set_focus(false);
            }
        }
        InputDisposition::Forwarded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{EngineCall, MockEngine, MockOverlays, MockSurface, bound_controller, controller};

    fn translator(
        controller: Arc<BrowserCreationController>,
        engine: Arc<MockEngine>,
        overlays: Arc<MockOverlays>,
    ) -> InputEventTranslator {
        InputEventTranslator::new(controller, engine, overlays)
    }

    #[test]
    fn test_drops_events_while_unbound() {
        let engine = Arc::new(MockEngine::new());
        let surface = Arc::new(MockSurface::realized(1));
        let ctl = controller(engine.clone(), surface);
        let input = translator(ctl, engine.clone(), Arc::new(MockOverlays::default()));

        let press = PointerEvent::new(PointerEventKind::Pressed, 5, 5)
            .with_button(MouseButton::Left, 1);
        assert_eq!(input.send_pointer_event(press), InputDisposition::Dropped);
        assert_eq!(input.focus_gained(), InputDisposition::Dropped);
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_drops_events_while_creating() {
        let engine = Arc::new(MockEngine::new());
        let surface = Arc::new(MockSurface::realized(1));
        let ctl = controller(engine.clone(), surface);
        ctl.request_creation(true);
        assert!(!ctl.is_bound());

        let input = translator(ctl, engine.clone(), Arc::new(MockOverlays::default()));
        let wheel = WheelEvent {
            x: 1,
            y: 1,
            delta_x: 0.0,
            delta_y: 40.0,
            modifiers: Modifiers::empty(),
        };
        assert_eq!(input.send_wheel_event(wheel), InputDisposition::Dropped);
        assert_eq!(engine.count(|c| matches!(c, EngineCall::Wheel(_))), 0);
    }

    #[test]
    fn test_forwards_each_event_once_when_bound() {
        let engine = Arc::new(MockEngine::new());
        let ctl = bound_controller(engine.clone());
        let input = translator(ctl, engine.clone(), Arc::new(MockOverlays::default()));

        let key = KeyEvent {
            kind: KeyEventKind::Typed,
            key_code: 65,
            character: Some('a'),
            modifiers: Modifiers::SHIFT,
        };
        let moved = PointerEvent::new(PointerEventKind::Moved, 3, 4);

        assert_eq!(input.send_key_event(key), InputDisposition::Forwarded);
        assert_eq!(input.send_pointer_event(moved), InputDisposition::Forwarded);
        assert_eq!(input.send_pointer_event(moved), InputDisposition::Forwarded);

        assert_eq!(engine.count(|c| *c == EngineCall::Key(key)), 1);
        assert_eq!(engine.count(|c| *c == EngineCall::Pointer(moved)), 2);
    }

    #[test]
    fn test_focus_gained_dismisses_overlays_first() {
        let engine = Arc::new(MockEngine::new());
        let overlays = Arc::new(MockOverlays::default());
        let ctl = bound_controller(engine.clone());
        let input = translator(ctl, engine.clone(), overlays.clone());

        let before = engine.calls().len();
        assert_eq!(input.focus_gained(), InputDisposition::Forwarded);
        assert_eq!(overlays.dismissals(), 1);
        assert_eq!(engine.calls()[before..], [EngineCall::SetFocus(true)]);

        assert_eq!(input.focus_lost(), InputDisposition::Forwarded);
        assert_eq!(overlays.dismissals(), 1);
        assert_eq!(engine.calls().last(), Some(&EngineCall::SetFocus(false)));
    }

    #[test]
    fn test_modifier_flags_combine() {
        let mods = Modifiers::CONTROL | Modifiers::LEFT_BUTTON;
        assert!(mods.contains(Modifiers::CONTROL));
        assert!(!mods.contains(Modifiers::ALT));
    }
}
