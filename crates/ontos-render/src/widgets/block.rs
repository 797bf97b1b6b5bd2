#![forbid(unsafe_code)]

//! Bordered container with an optional title.

use ontos_core::geometry::{Rect, Sides};

use super::Widget;
use crate::cell::Cell;
use crate::display_width;
use crate::frame::Frame;
use crate::style::Style;

/// Border glyph sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderType {
    /// `┌─┐` square corners.
    Square,
    /// `╭─╮` rounded corners.
    #[default]
    Rounded,
    /// `┏━┓` heavy lines.
    Heavy,
    /// No border; the block only paints its background and padding.
    None,
}

struct BorderChars {
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
    horizontal: char,
    vertical: char,
}

impl BorderType {
    fn chars(self) -> Option<BorderChars> {
        let (tl, tr, bl, br, h, v) = match self {
            Self::Square => ('┌', '┐', '└', '┘', '─', '│'),
            Self::Rounded => ('╭', '╮', '╰', '╯', '─', '│'),
            Self::Heavy => ('┏', '┓', '┗', '┛', '━', '┃'),
            Self::None => return None,
        };
        Some(BorderChars {
            top_left: tl,
            top_right: tr,
            bottom_left: bl,
            bottom_right: br,
            horizontal: h,
            vertical: v,
        })
    }
}

/// A panel: background, border, title, padding.
#[derive(Debug, Clone, Default)]
pub struct Block<'a> {
    border_type: BorderType,
    border_style: Style,
    style: Style,
    title: Option<&'a str>,
    title_style: Style,
    title_right: Option<&'a str>,
    padding: Sides,
}

impl<'a> Block<'a> {
    /// Rounded border, no title.
    pub fn bordered() -> Self {
        Self::default()
    }

    /// Background only.
    pub fn plain() -> Self {
        Self {
            border_type: BorderType::None,
            ..Self::default()
        }
    }

    /// Set the border glyphs.
    #[must_use]
    pub fn border_type(mut self, border_type: BorderType) -> Self {
        self.border_type = border_type;
        self
    }

    /// Style of the border glyphs.
    #[must_use]
    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    /// Style of the whole area (usually just a background).
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Title drawn into the top border, left aligned.
    #[must_use]
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }

    /// Style of both titles.
    #[must_use]
    pub fn title_style(mut self, style: Style) -> Self {
        self.title_style = style;
        self
    }

    /// Secondary title drawn into the top border, right aligned.
    #[must_use]
    pub fn title_right(mut self, title: &'a str) -> Self {
        self.title_right = Some(title);
        self
    }

    /// Inner padding.
    #[must_use]
    pub fn padding(mut self, padding: Sides) -> Self {
        self.padding = padding;
        self
    }

    /// Content area left after border and padding.
    pub fn inner(&self, area: Rect) -> Rect {
        let border = if self.border_type == BorderType::None {
            0
        } else {
            1
        };
        area.inner(Sides::all(border)).inner(self.padding)
    }

    /// Rows consumed by border and padding.
    pub fn vertical_chrome(&self) -> u16 {
        let border = if self.border_type == BorderType::None {
            0
        } else {
            2
        };
        border + self.padding.vertical_sum()
    }
}

impl Widget for Block<'_> {
    fn render(&self, area: Rect, frame: &mut Frame) {
        let area = area.intersection(&frame.bounds());
        if area.is_empty() {
            return;
        }
        frame.fill_bg(area, self.style);

        let Some(set) = self.border_type.chars() else {
            return;
        };
        let border = self.style.patch(self.border_style);
        let glyph = |c: char| {
            let mut cell = Cell::from_char(c);
            border.apply(&mut cell);
            cell
        };
        let buf = &mut frame.buffer;
        let (right, bottom) = (area.right() - 1, area.bottom() - 1);
        for x in area.x..area.right() {
            buf.set(x, area.y, glyph(set.horizontal));
            buf.set(x, bottom, glyph(set.horizontal));
        }
        for y in area.y..area.bottom() {
            buf.set(area.x, y, glyph(set.vertical));
            buf.set(right, y, glyph(set.vertical));
        }
        buf.set(area.x, area.y, glyph(set.top_left));
        buf.set(right, area.y, glyph(set.top_right));
        buf.set(area.x, bottom, glyph(set.bottom_left));
        buf.set(right, bottom, glyph(set.bottom_right));

        let title_style = self.style.patch(self.title_style);
        if let Some(title) = self.title {
            let label = format!(" {title} ");
            buf.set_stringn(area.x + 2, area.y, &label, right.saturating_sub(1), title_style);
        }
        if let Some(title) = self.title_right {
            let label = format!(" {title} ");
            let w = u16::try_from(display_width(&label)).unwrap_or(u16::MAX);
            let x = right.saturating_sub(1).saturating_sub(w);
            if x > area.x + 2 {
                buf.set_stringn(x, area.y, &label, right, title_style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_rounded_border_and_title() {
        let mut f = Frame::new(12, 3);
        Block::bordered().title("LOG").render(f.bounds(), &mut f);
        assert_eq!(f.buffer.row_text(0), "╭─ LOG ────╮");
        assert_eq!(f.buffer.row_text(1), "│          │");
        assert_eq!(f.buffer.row_text(2), "╰──────────╯");
    }

    #[test]
    fn inner_accounts_for_padding() {
        let b = Block::bordered().padding(Sides::horizontal(1));
        assert_eq!(b.inner(Rect::new(0, 0, 10, 5)), Rect::new(2, 1, 6, 3));
        assert_eq!(Block::plain().inner(Rect::new(0, 0, 4, 4)), Rect::new(0, 0, 4, 4));
    }

    #[test]
    fn right_title() {
        let mut f = Frame::new(20, 3);
        Block::bordered()
            .title("A")
            .title_right("12/40")
            .render(f.bounds(), &mut f);
        assert!(f.buffer.row_text(0).contains(" 12/40 ─╮"));
    }
}
