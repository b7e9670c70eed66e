//! Test-pattern engine.
//!
//! Stands in for a real browser engine: it paints a scrolling stripe pattern
//! on its own thread and drives the bridge through the same callbacks a
//! native engine would, including partial repaints, popups and cursors.

use crossbeam_channel::{Receiver, Sender, unbounded};
use osr_bridge::{
    BYTES_PER_PIXEL, BrowserId, CreateBrowserParams, CreateDevToolsParams, CursorType,
    DirtyRect, EngineError, KeyEvent, KeyEventKind, MouseButton, NativeEngine, Point,
    PointerEvent, PointerEventKind, Rect, RenderHandler, WheelEvent,
};
use std::sync::{Mutex, Weak};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, trace, warn};

/// Height of the band at the top that shows a hand cursor
const LINK_BAND: i32 = 48;
/// Side of the box drawn under the pointer
const MARKER: u32 = 12;
const POPUP_SIZE: (u32, u32) = (160, 96);
const STRIPE: i32 = 32;

const PALETTES: [[[u8; 4]; 2]; 3] = [
    [[0xf0, 0xe0, 0xd0, 0xff], [0xc0, 0x90, 0x60, 0xff]],
    [[0xd0, 0xf0, 0xd0, 0xff], [0x50, 0xa0, 0x50, 0xff]],
    [[0xe0, 0xd0, 0xf0, 0xff], [0x90, 0x50, 0xc0, 0xff]],
];
const MARKER_COLOR: [u8; 4] = [0x20, 0x20, 0x20, 0xff];
const FOCUS_COLOR: [u8; 4] = [0xd0, 0x80, 0x20, 0xff];
const POPUP_COLOR: [u8; 4] = [0x40, 0x40, 0x40, 0xff];

enum PatternCommand {
    Create,
    Resize(u32, u32),
    Pointer(PointerEvent),
    Key(KeyEvent),
    Wheel(WheelEvent),
    Focus(bool),
    Shutdown,
}

/// What the pattern looks like at one moment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternState {
    pub width: u32,
    pub height: u32,
    pub scroll: i32,
    pub palette: usize,
    pub pointer: Option<Point>,
    pub focused: bool,
}

impl PatternState {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            scroll: 0,
            palette: 0,
            pointer: None,
            focused: false,
        }
    }

    fn marker_rect(&self) -> Option<Rect> {
        let p = self.pointer?;
        let half = (MARKER / 2) as i32;
        Rect::new(p.x - half, p.y - half, MARKER, MARKER)
            .intersect(&Rect::from_size(self.width, self.height))
    }

    fn cursor(&self) -> CursorType {
        match self.pointer {
            Some(p) if p.y < LINK_BAND => CursorType::Hand,
            _ => CursorType::Default,
        }
    }
}

/// Paint the whole view as BGRA
pub fn render_pattern(state: &PatternState) -> Vec<u8> {
    let (width, height) = (state.width as usize, state.height as usize);
    let colors = PALETTES[state.palette % PALETTES.len()];
    let marker = state.marker_rect();
    let mut pixels = vec![0u8; width * height * BYTES_PER_PIXEL];

    for (i, px) in pixels.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
        let x = (i % width) as i32;
        let y = (i / width) as i32;
        let on_border = x < 2 || y < 2 || x >= width as i32 - 2 || y >= height as i32 - 2;

        let color = if marker.is_some_and(|m| m.contains(x, y)) {
            MARKER_COLOR
        } else if state.focused && on_border {
            FOCUS_COLOR
        } else {
            colors[((x + y + state.scroll).rem_euclid(STRIPE * 2) / STRIPE) as usize]
        };
        px.copy_from_slice(&color);
    }
    pixels
}

fn render_popup() -> Vec<u8> {
    let (w, h) = POPUP_SIZE;
    POPUP_COLOR.repeat(w as usize * h as usize)
}

struct PatternWorker {
    handler: Weak<dyn RenderHandler>,
    state: Option<PatternState>,
    popup: Option<Rect>,
    cursor: CursorType,
    next_id: u64,
}

impl PatternWorker {
    fn paint(&self, dirty: &[DirtyRect]) {
        let (Some(state), Some(handler)) = (self.state, self.handler.upgrade()) else {
            return;
        };
        trace!("Painting {} region(s)", dirty.len());
        handler.on_paint(false, dirty, &render_pattern(&state), state.width, state.height);
    }

    fn paint_all(&self) {
        if let Some(state) = self.state {
            self.paint(&[Rect::from_size(state.width, state.height)]);
        }
    }

    fn show_popup(&mut self, handler: &dyn RenderHandler, at: Point) {
        let (w, h) = POPUP_SIZE;
        let rect = Rect::new(at.x, at.y, w, h);
        handler.on_popup_show(true);
        handler.on_popup_size(rect);
        handler.on_paint(true, &[Rect::from_size(w, h)], &render_popup(), w, h);
        self.popup = Some(rect);
    }

    fn hide_popup(&mut self, handler: &dyn RenderHandler) {
        if self.popup.take().is_some() {
            handler.on_popup_show(false);
        }
    }

    fn pointer(&mut self, event: PointerEvent) {
        let Some(handler) = self.handler.upgrade() else {
            return;
        };
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event.kind {
            PointerEventKind::Moved | PointerEventKind::Dragged | PointerEventKind::Entered => {
                let before = state.marker_rect();
                state.pointer = Some(Point::new(event.x, event.y));
                let after = state.marker_rect();

                let cursor = state.cursor();
                let dirty: Vec<DirtyRect> = before.into_iter().chain(after).collect();
                if cursor != self.cursor {
                    self.cursor = cursor;
                    handler.on_cursor_change(cursor);
                }
                if !dirty.is_empty() {
                    self.paint(&dirty);
                }
            }
            PointerEventKind::Exited => {
                let before = state.marker_rect();
                state.pointer = None;
                if let Some(rect) = before {
                    self.paint(&[rect]);
                }
            }
            PointerEventKind::Pressed => match event.button {
                Some(MouseButton::Right) => {
                    self.show_popup(handler.as_ref(), Point::new(event.x, event.y));
                }
                _ => self.hide_popup(handler.as_ref()),
            },
            PointerEventKind::Released | PointerEventKind::Clicked => {}
        }
    }

    fn run(mut self, commands: Receiver<PatternCommand>) {
        for command in commands {
            match command {
                PatternCommand::Create => {
                    let Some(handler) = self.handler.upgrade() else {
                        break;
                    };
                    let view = handler.view_rect();
                    self.state = Some(PatternState::new(view.width, view.height));
                    self.next_id += 1;
                    info!("Test pattern browser {} created", self.next_id);
                    handler.on_after_created(BrowserId(self.next_id));
                    self.paint_all();
                }
                PatternCommand::Resize(width, height) => {
                    if let Some(state) = self.state.as_mut() {
                        state.width = width.max(1);
                        state.height = height.max(1);
                        self.paint_all();
                    }
                }
                PatternCommand::Pointer(event) => self.pointer(event),
                PatternCommand::Wheel(event) => {
                    if let Some(state) = self.state.as_mut() {
                        state.scroll += event.delta_y.round() as i32;
                        self.paint_all();
                    }
                }
                PatternCommand::Key(event) => {
                    if event.kind == KeyEventKind::Typed {
                        if let Some(state) = self.state.as_mut() {
                            state.palette += 1;
                            self.paint_all();
                        }
                    }
                }
                PatternCommand::Focus(focused) => {
                    if let Some(state) = self.state.as_mut() {
                        state.focused = focused;
                        self.paint_all();
                    }
                }
                PatternCommand::Shutdown => break,
            }
        }
        debug!("Test pattern worker stopped");
    }
}

/// [`NativeEngine`] that renders a synthetic page on a worker thread
pub struct TestPatternEngine {
    commands: Sender<PatternCommand>,
    pending: Mutex<Option<Receiver<PatternCommand>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TestPatternEngine {
    pub fn new() -> Self {
        let (commands, rx) = unbounded();
        Self {
            commands,
            pending: Mutex::new(Some(rx)),
            worker: Mutex::new(None),
        }
    }

    /// Start painting for `handler`. Only the first call has an effect.
    pub fn attach(&self, handler: Weak<dyn RenderHandler>) {
        let Some(commands) = self.pending.lock().ok().and_then(|mut rx| rx.take()) else {
            warn!("Test pattern engine already attached");
            return;
        };

        let worker = PatternWorker {
            handler,
            state: None,
            popup: None,
            cursor: CursorType::Default,
            next_id: 0,
        };
        let handle = thread::Builder::new()
            .name("test-pattern".to_string())
            .spawn(move || worker.run(commands));
        match handle {
            Ok(handle) => {
                if let Ok(mut slot) = self.worker.lock() {
                    *slot = Some(handle);
                }
            }
            Err(e) => warn!("Failed to start test pattern worker: {}", e),
        }
    }

    /// Stop the worker and wait for it
    pub fn shutdown(&self) {
        let _ = self.commands.send(PatternCommand::Shutdown);
        let handle = self.worker.lock().ok().and_then(|mut h| h.take());
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("Test pattern worker panicked");
            }
        }
    }

    fn send(&self, command: PatternCommand) {
        if self.commands.send(command).is_err() {
            trace!("Test pattern worker gone, command dropped");
        }
    }
}

impl Default for TestPatternEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeEngine for TestPatternEngine {
    fn create_browser(&self, params: CreateBrowserParams) -> Result<(), EngineError> {
        debug!("Test pattern stands in for {}", params.url);
        self.commands
            .send(PatternCommand::Create)
            .map_err(|_| EngineError::ShuttingDown)
    }

    fn create_dev_tools(&self, _params: CreateDevToolsParams) -> Result<(), EngineError> {
        Err(EngineError::CreationRejected(
            "test pattern engine has no DevTools".to_string(),
        ))
    }

    fn send_pointer_event(&self, event: &PointerEvent) {
        self.send(PatternCommand::Pointer(*event));
    }

    fn send_key_event(&self, event: &KeyEvent) {
        self.send(PatternCommand::Key(*event));
    }

    fn send_wheel_event(&self, event: &WheelEvent) {
        self.send(PatternCommand::Wheel(*event));
    }

    fn set_focus(&self, focused: bool) {
        self.send(PatternCommand::Focus(focused));
    }

    fn notify_view_size_changed(&self, width: u32, height: u32) {
        self.send(PatternCommand::Resize(width, height));
    }
}
