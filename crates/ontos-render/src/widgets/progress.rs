#![forbid(unsafe_code)]

//! Single-row progress bar.

use ontos_core::geometry::Rect;

use super::Widget;
use crate::cell::PackedRgba;
use crate::frame::Frame;
use crate::style::Style;

/// Horizontal bar filled to `ratio` of its width.
///
/// The fill uses eighth-block glyphs for the partial cell, so progress moves
/// smoothly even on narrow bars.
#[derive(Debug, Clone, Copy)]
pub struct ProgressBar {
    ratio: f64,
    filled: PackedRgba,
    track: PackedRgba,
    thin: bool,
}

const EIGHTHS: [char; 8] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉'];

impl ProgressBar {
    /// A bar at `ratio` (clamped to [0, 1]).
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio: if ratio.is_finite() {
                ratio.clamp(0.0, 1.0)
            } else {
                0.0
            },
            filled: PackedRgba::WHITE,
            track: PackedRgba::TRANSPARENT,
            thin: false,
        }
    }

    /// Fill and track colors.
    #[must_use]
    pub fn colors(mut self, filled: PackedRgba, track: PackedRgba) -> Self {
        self.filled = filled;
        self.track = track;
        self
    }

    /// Draw as a thin `━` line instead of solid blocks.
    #[must_use]
    pub fn thin(mut self, thin: bool) -> Self {
        self.thin = thin;
        self
    }

    /// Number of fully filled cells for a given width.
    pub fn filled_cells(&self, width: u16) -> u16 {
        (self.ratio * f64::from(width)).floor() as u16
    }
}

impl Widget for ProgressBar {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }
        let width = area.width;
        let eighths = (self.ratio * f64::from(width) * 8.0).round() as u32;
        let full = (eighths / 8) as u16;
        let partial = (eighths % 8) as usize;
        let y = area.y;

        for i in 0..width {
            let x = area.x + i;
            let (glyph, style) = if self.thin {
                let color = if i < full || (i == full && partial >= 4) {
                    self.filled
                } else {
                    self.track
                };
                ("━".to_string(), Style::new().fg(color))
            } else if i < full {
                ("█".to_string(), Style::new().fg(self.filled))
            } else if i == full && partial > 0 {
                (
                    EIGHTHS[partial].to_string(),
                    Style::new().fg(self.filled).bg(self.track),
                )
            } else {
                (" ".to_string(), Style::new().bg(self.track))
            };
            frame.buffer.set_stringn(x, y, &glyph, area.right(), style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_bar() {
        let mut f = Frame::new(8, 1);
        ProgressBar::new(0.5).render(f.bounds(), &mut f);
        assert_eq!(f.buffer.row_text(0), "████");
    }

    #[test]
    fn partial_cell_uses_eighths() {
        let mut f = Frame::new(4, 1);
        ProgressBar::new(0.625).render(f.bounds(), &mut f);
        assert_eq!(f.buffer.row_text(0), "██▌");
    }

    #[test]
    fn clamps_ratio() {
        assert_eq!(ProgressBar::new(7.0).filled_cells(10), 10);
        assert_eq!(ProgressBar::new(f64::NAN).filled_cells(10), 0);
    }

    #[test]
    fn thin_bar_spans_width() {
        let mut f = Frame::new(6, 1);
        ProgressBar::new(0.25).thin(true).render(f.bounds(), &mut f);
        assert_eq!(f.buffer.row_text(0), "━━━━━━");
    }
}
