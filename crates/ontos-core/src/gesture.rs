#![forbid(unsafe_code)]

//! Horizontal swipe recognition.
//!
//! Terminals report drags in cells, so displacement is converted to nominal
//! pixels (8 px per column, 16 px per row) before the threshold test. A drag
//! counts as a swipe only when the horizontal travel is larger than the
//! vertical travel *and* larger than the threshold, which keeps vertical
//! scrolling drags from changing phase.

use crate::event::{MouseButton, MouseEvent, MouseEventKind};

/// Nominal pixel width of one terminal column.
pub const CELL_WIDTH_PX: i32 = 8;
/// Nominal pixel height of one terminal row.
pub const CELL_HEIGHT_PX: i32 = 16;
/// Minimum horizontal travel, in pixels.
pub const SWIPE_THRESHOLD_PX: i32 = 50;

/// Direction of a recognized swipe (direction the finger moved).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Finger moved left: go forward.
    Left,
    /// Finger moved right: go back.
    Right,
}

/// Classify a displacement in pixels.
///
/// `dx`/`dy` are `start - end`, so a positive `dx` means the pointer moved
/// left.
#[must_use]
pub fn classify(dx: i32, dy: i32, threshold: i32) -> Option<Swipe> {
    if dx.abs() > dy.abs() && dx.abs() > threshold {
        Some(if dx > 0 { Swipe::Left } else { Swipe::Right })
    } else {
        None
    }
}

/// Tracks one left-button drag at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwipeDetector {
    origin: Option<(u16, u16)>,
}

impl SwipeDetector {
    /// A detector with no drag in progress.
    #[must_use]
    pub const fn new() -> Self {
        Self { origin: None }
    }

    /// Feed a mouse event; returns a swipe when a drag ends past threshold.
    pub fn handle(&mut self, event: &MouseEvent) -> Option<Swipe> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.origin = Some((event.x, event.y));
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let (x0, y0) = self.origin.take()?;
                let dx = (i32::from(x0) - i32::from(event.x)) * CELL_WIDTH_PX;
                let dy = (i32::from(y0) - i32::from(event.y)) * CELL_HEIGHT_PX;
                classify(dx, dy, SWIPE_THRESHOLD_PX)
            }
            _ => None,
        }
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub const fn is_tracking(&self) -> bool {
        self.origin.is_some()
    }

    /// Forget any drag in progress.
    pub fn reset(&mut self) {
        self.origin = None;
    }
}
