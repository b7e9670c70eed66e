//! winit input to bridge input events.
//!
//! Tracks pointer position, held buttons and click counts, which winit
//! reports separately, and synthesizes the click and drag events the
//! engine expects.

use osr_bridge::{
    FocusEvent, InputDisposition, InputEvent, InputEventSource, InputSink, KeyEvent, KeyEventKind,
    Modifiers, MouseButton, PointerEvent, PointerEventKind, WheelEvent,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, ModifiersState, NamedKey};

/// Pixels scrolled per wheel line
const LINE_HEIGHT: f32 = 40.0;
const MULTI_CLICK_TIME: Duration = Duration::from_millis(500);

fn button_flag(button: MouseButton) -> Modifiers {
    match button {
        MouseButton::Left => Modifiers::LEFT_BUTTON,
        MouseButton::Middle => Modifiers::MIDDLE_BUTTON,
        MouseButton::Right => Modifiers::RIGHT_BUTTON,
    }
}

fn map_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        _ => None,
    }
}

fn map_modifiers(state: ModifiersState) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, state.shift_key());
    modifiers.set(Modifiers::CONTROL, state.control_key());
    modifiers.set(Modifiers::ALT, state.alt_key());
    modifiers.set(Modifiers::META, state.super_key());
    modifiers
}

/// Virtual key code for a logical key, 0 when unmapped
pub fn key_code(key: &Key) -> u32 {
    match key {
        Key::Named(named) => match named {
            NamedKey::Backspace => 8,
            NamedKey::Tab => 9,
            NamedKey::Enter => 10,
            NamedKey::Shift => 16,
            NamedKey::Control => 17,
            NamedKey::Alt => 18,
            NamedKey::Escape => 27,
            NamedKey::Space => 32,
            NamedKey::PageUp => 33,
            NamedKey::PageDown => 34,
            NamedKey::End => 35,
            NamedKey::Home => 36,
            NamedKey::ArrowLeft => 37,
            NamedKey::ArrowUp => 38,
            NamedKey::ArrowRight => 39,
            NamedKey::ArrowDown => 40,
            NamedKey::Delete => 127,
            _ => 0,
        },
        Key::Character(text) => text
            .chars()
            .next()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase() as u32)
            .unwrap_or(0),
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    button: MouseButton,
    x: i32,
    y: i32,
    at: Instant,
    count: u32,
}

/// Translates winit window events for an attached [`InputSink`]
#[derive(Default)]
pub struct WinitInput {
    sink: Option<Arc<dyn InputSink>>,
    x: i32,
    y: i32,
    keyboard: Modifiers,
    buttons: Modifiers,
    last_press: Option<Press>,
}

impl InputEventSource for WinitInput {
    fn attach(&mut self, sink: Arc<dyn InputSink>) {
        self.sink = Some(sink);
    }
}

impl WinitInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn modifiers(&self) -> Modifiers {
        self.keyboard | self.buttons
    }

    fn pointer(&self, kind: PointerEventKind) -> PointerEvent {
        PointerEvent::new(kind, self.x, self.y).with_modifiers(self.modifiers())
    }

    pub fn cursor_moved(&mut self, x: i32, y: i32) -> Vec<InputEvent> {
        self.x = x;
        self.y = y;
        let kind = if self.buttons.is_empty() {
            PointerEventKind::Moved
        } else {
            PointerEventKind::Dragged
        };
        vec![InputEvent::Pointer(self.pointer(kind))]
    }

    pub fn cursor_entered(&mut self) -> Vec<InputEvent> {
        vec![InputEvent::Pointer(self.pointer(PointerEventKind::Entered))]
    }

    pub fn cursor_left(&mut self) -> Vec<InputEvent> {
        vec![InputEvent::Pointer(self.pointer(PointerEventKind::Exited))]
    }

    pub fn mouse_input(
        &mut self,
        state: ElementState,
        button: winit::event::MouseButton,
    ) -> Vec<InputEvent> {
        let Some(button) = map_button(button) else {
            return Vec::new();
        };

        match state {
            ElementState::Pressed => {
                let now = Instant::now();
                let count = match self.last_press {
                    Some(p)
                        if p.button == button
                            && (p.x, p.y) == (self.x, self.y)
                            && now.duration_since(p.at) < MULTI_CLICK_TIME =>
                    {
                        p.count + 1
                    }
                    _ => 1,
                };
                self.last_press = Some(Press {
                    button,
                    x: self.x,
                    y: self.y,
                    at: now,
                    count,
                });
                self.buttons |= button_flag(button);
                let event = self
                    .pointer(PointerEventKind::Pressed)
                    .with_button(button, count);
                vec![InputEvent::Pointer(event)]
            }
            ElementState::Released => {
                let count = self.last_press.map_or(1, |p| p.count);
                let released = self
                    .pointer(PointerEventKind::Released)
                    .with_button(button, count);
                self.buttons.remove(button_flag(button));

                let mut events = vec![InputEvent::Pointer(released)];
                let same_spot = self
                    .last_press
                    .is_some_and(|p| p.button == button && (p.x, p.y) == (self.x, self.y));
                if same_spot {
                    let clicked = self
                        .pointer(PointerEventKind::Clicked)
                        .with_button(button, count);
                    events.push(InputEvent::Pointer(clicked));
                }
                events
            }
        }
    }

    pub fn mouse_wheel(&mut self, delta: MouseScrollDelta) -> Vec<InputEvent> {
        // winit reports positive y when scrolling up
        let (delta_x, delta_y) = match delta {
            MouseScrollDelta::LineDelta(x, y) => (-x * LINE_HEIGHT, -y * LINE_HEIGHT),
            MouseScrollDelta::PixelDelta(p) => (-p.x as f32, -p.y as f32),
        };
        vec![InputEvent::Wheel(WheelEvent {
            x: self.x,
            y: self.y,
            delta_x,
            delta_y,
            modifiers: self.modifiers(),
        })]
    }

    pub fn modifiers_changed(&mut self, state: ModifiersState) {
        self.keyboard = map_modifiers(state);
    }

    pub fn key(&mut self, key: &Key, state: ElementState, text: Option<&str>) -> Vec<InputEvent> {
        let key_code = key_code(key);
        let modifiers = self.modifiers();
        let kind = match state {
            ElementState::Pressed => KeyEventKind::Pressed,
            ElementState::Released => KeyEventKind::Released,
        };

        let mut events = vec![InputEvent::Key(KeyEvent {
            kind,
            key_code,
            character: None,
            modifiers,
        })];
        if state == ElementState::Pressed {
            for character in text.into_iter().flat_map(str::chars) {
                events.push(InputEvent::Key(KeyEvent {
                    kind: KeyEventKind::Typed,
                    key_code,
                    character: Some(character),
                    modifiers,
                }));
            }
        }
        events
    }

    /// Translate one window event. Returns what the sink did with each
    /// resulting bridge event.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Vec<InputDisposition> {
        let events = match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x.round() as i32, position.y.round() as i32)
            }
            WindowEvent::CursorEntered { .. } => self.cursor_entered(),
            WindowEvent::CursorLeft { .. } => self.cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => self.mouse_input(*state, *button),
            WindowEvent::MouseWheel { delta, .. } => self.mouse_wheel(*delta),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers_changed(modifiers.state());
                Vec::new()
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.key(&event.logical_key, event.state, event.text.as_deref())
            }
            WindowEvent::Focused(true) => vec![InputEvent::Focus(FocusEvent::Gained)],
            WindowEvent::Focused(false) => vec![InputEvent::Focus(FocusEvent::Lost)],
            _ => Vec::new(),
        };
        self.deliver(events)
    }

    fn deliver(&self, events: Vec<InputEvent>) -> Vec<InputDisposition> {
        let Some(sink) = &self.sink else {
            return Vec::new();
        };
        events
            .into_iter()
            .map(|event| {
                let disposition = sink.handle_input(event);
                trace!("{:?} -> {:?}", event, disposition);
                disposition
            })
            .collect()
    }
}
