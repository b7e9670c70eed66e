//! Geometry shared between the host surface and the native engine.
//!
//! All rectangles are in surface-local pixel space with the origin at the
//! top-left corner, matching what the engine reports in paint callbacks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer rectangle (x, y, width, height)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle anchored at the origin
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (x as i64) >= self.x as i64
            && (y as i64) >= self.y as i64
            && (x as i64) < self.right()
            && (y as i64) < self.bottom()
    }

    /// Intersection of two rectangles, `None` when they don't overlap
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = (self.x as i64).max(other.x as i64);
        let top = (self.y as i64).max(other.y as i64);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return None;
        }

        Some(Rect {
            x: left as i32,
            y: top as i32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {}x{}", self.x, self.y, self.width, self.height)
    }
}

/// Current bounds of the render surface
pub type ViewRect = Rect;

/// Bounds of an active popup overlay
pub type PopupRect = Rect;

/// Changed sub-area of a delivered pixel buffer
pub type DirtyRect = Rect;

/// A point in either surface-local or global screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this point by another one
    pub fn translate(self, by: Point) -> Self {
        Self {
            x: self.x.saturating_add(by.x),
            y: self.y.saturating_add(by.y),
        }
    }
}

/// Origin of the render surface in global screen coordinates
pub type ScreenPoint = Point;

/// View bounds and screen origin, published together by `reshape`.
///
/// Readers on other threads always observe a matching pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewGeometry {
    pub view_rect: ViewRect,
    pub screen_origin: ScreenPoint,
}

impl ViewGeometry {
    /// The engine misbehaves when asked for a zero-area view, so the
    /// surface starts out as a 1x1 rectangle until the first reshape.
    pub const INITIAL: ViewGeometry = ViewGeometry {
        view_rect: Rect::new(0, 0, 1, 1),
        screen_origin: Point::new(0, 0),
    };

    /// Translate a surface-local point to global screen coordinates
    pub fn to_screen(&self, view_point: Point) -> ScreenPoint {
        self.screen_origin.translate(view_point)
    }
}

impl Default for ViewGeometry {
    fn default() -> Self {
        Self::INITIAL
    }
}
