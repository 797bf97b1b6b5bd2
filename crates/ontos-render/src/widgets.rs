#![forbid(unsafe_code)]

//! Widgets used by the demo views.
//!
//! Widgets are short-lived value types built during `view` and rendered into
//! a [`Frame`]. None of them hold state between frames.

pub mod block;
pub mod paragraph;
pub mod progress;
pub mod sparkline;

use ontos_core::geometry::Rect;

use crate::frame::Frame;

pub use block::{Block, BorderType};
pub use paragraph::Paragraph;
pub use progress::ProgressBar;
pub use sparkline::Sparkline;

/// Something that draws itself into a rectangle of a frame.
pub trait Widget {
    /// Render into `area`.
    fn render(&self, area: Rect, frame: &mut Frame);
}
