//! Drag and drop for off-screen browsers.
//!
//! Not supported yet: the engine's drag callbacks are answered with an
//! explicit [`Unsupported`] result so hosts and tests can tell a rejected
//! drag from a silently ignored one.

use bitflags::bitflags;
use std::fmt;
use thiserror::Error;

bitflags! {
    /// Drag operations the source allows or the target accepts
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DragOperations: u32 {
        const COPY = 1 << 0;
        const LINK = 1 << 1;
        const GENERIC = 1 << 2;
        const PRIVATE = 1 << 3;
        const MOVE = 1 << 4;
        const DELETE = 1 << 5;
    }
}

/// Features an off-screen browser may lack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    DragAndDrop,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DragAndDrop => write!(f, "drag and drop"),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{0} is not implemented for off-screen browsers")]
pub struct Unsupported(pub Capability);
