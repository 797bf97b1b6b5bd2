#![forbid(unsafe_code)]

//! Multi-line styled text with optional wrapping and vertical scroll.

use ontos_core::geometry::Rect;

use super::Widget;
use crate::frame::Frame;
use crate::style::Style;
use crate::text::{Line, center_offset, wrap_line};

/// Horizontal placement of each line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
}

/// Lines of styled text.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    lines: Vec<Line>,
    style: Style,
    wrap: bool,
    scroll: u16,
    alignment: Alignment,
}

impl Paragraph {
    /// Paragraph from lines.
    pub fn new(lines: Vec<Line>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    /// Base style for every span.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Word-wrap lines to the render width.
    #[must_use]
    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Skip the first `rows` visual rows.
    #[must_use]
    pub fn scroll(mut self, rows: u16) -> Self {
        self.scroll = rows;
        self
    }

    /// Line alignment.
    #[must_use]
    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    fn visual_lines(&self, width: u16) -> Vec<Line> {
        if !self.wrap {
            return self.lines.clone();
        }
        self.lines
            .iter()
            .flat_map(|l| wrap_line(l, usize::from(width)))
            .collect()
    }

    /// Rows needed to show everything at `width`.
    pub fn height(&self, width: u16) -> u16 {
        u16::try_from(self.visual_lines(width).len()).unwrap_or(u16::MAX)
    }
}

impl Widget for Paragraph {
    fn render(&self, area: Rect, frame: &mut Frame) {
        if area.is_empty() {
            return;
        }
        let lines = self.visual_lines(area.width);
        for (row, line) in lines
            .iter()
            .skip(usize::from(self.scroll))
            .take(usize::from(area.height))
            .enumerate()
        {
            let x = match self.alignment {
                Alignment::Left => area.x,
                Alignment::Center => area.x + center_offset(area.width, line.width()),
            };
            line.render(
                &mut frame.buffer,
                x,
                area.y + row as u16,
                area.right(),
                self.style,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_and_scrolls() {
        let p = Paragraph::new(vec![Line::raw("one two three four")]).wrap(true);
        assert_eq!(p.height(9), 3);

        let mut f = Frame::new(9, 1);
        p.scroll(1).render(f.bounds(), &mut f);
        assert_eq!(f.buffer.row_text(0), "three");
    }

    #[test]
    fn centered_lines() {
        let mut f = Frame::new(9, 1);
        Paragraph::new(vec![Line::raw("abc")])
            .alignment(Alignment::Center)
            .render(f.bounds(), &mut f);
        assert_eq!(f.buffer.row_text(0), "   abc");
    }

    #[test]
    fn clips_rows() {
        let mut f = Frame::new(5, 1);
        Paragraph::new(vec![Line::raw("a"), Line::raw("b")]).render(f.bounds(), &mut f);
        assert_eq!(f.buffer.row_text(0), "a");
    }
}
