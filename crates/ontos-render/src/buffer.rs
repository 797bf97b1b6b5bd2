#![forbid(unsafe_code)]

//! The cell grid.
//!
//! Row-major storage with `(x, y)` addressing. Wide graphemes occupy their
//! lead cell plus a continuation cell; overwriting either half clears the
//! other so the grid never holds an orphaned half.

use ontos_core::geometry::Rect;
use unicode_segmentation::UnicodeSegmentation;

use crate::cell::{Cell, CellContent};
use crate::grapheme_width;
use crate::style::Style;

/// A `width` x `height` grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// A blank buffer.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    /// Width in columns.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The full buffer area.
    #[inline]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the buffer has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Cell at `(x, y)`.
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Mutable cell at `(x, y)`.
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(move |i| &mut self.cells[i])
    }

    /// Replace the cell at `(x, y)`, keeping wide graphemes consistent.
    ///
    /// A wide cell that does not fit before the right edge is dropped.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let wide = cell.width() > 1;
        if wide && x + 1 >= self.width {
            return;
        }
        self.clear_wide_at(x, y);
        if wide {
            self.clear_wide_at(x + 1, y);
            let mut tail = Cell::continuation();
            tail.fg = cell.fg;
            tail.bg = cell.bg;
            self.cells[i + 1] = tail;
        }
        self.cells[i] = cell;
    }

    /// Break up a wide grapheme that covers `(x, y)`.
    fn clear_wide_at(&mut self, x: u16, y: u16) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cells[i].is_continuation() && x > 0 {
            self.cells[i - 1].content = CellContent::Empty;
            self.cells[i].content = CellContent::Empty;
        } else if self.cells[i].width() > 1
            && let Some(next) = self.index(x + 1, y)
            && self.cells[next].is_continuation()
        {
            self.cells[next].content = CellContent::Empty;
        }
    }

    /// Fill a rectangle with copies of `cell`.
    pub fn fill(&mut self, rect: Rect, cell: &Cell) {
        let rect = rect.intersection(&self.area());
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if let Some(i) = self.index(x, y) {
                    self.cells[i] = cell.clone();
                }
            }
        }
    }

    /// Apply `style` to every cell in `rect`, keeping content.
    pub fn set_style(&mut self, rect: Rect, style: Style) {
        let rect = rect.intersection(&self.area());
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if let Some(i) = self.index(x, y) {
                    style.apply(&mut self.cells[i]);
                }
            }
        }
    }

    /// Reset every cell to blank.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Write `text` starting at `(x, y)`, clipped at column `max_x` (exclusive).
    ///
    /// Control characters are skipped. Existing backgrounds show through
    /// unless `style` sets one. Returns the column after the last grapheme
    /// written.
    pub fn set_stringn(&mut self, x: u16, y: u16, text: &str, max_x: u16, style: Style) -> u16 {
        let limit = max_x.min(self.width);
        let mut col = x;
        if y >= self.height {
            return col;
        }
        for g in text.graphemes(true) {
            let w = grapheme_width(g);
            if w == 0 {
                continue;
            }
            let w = w as u16;
            if col.saturating_add(w) > limit {
                break;
            }
            let mut cell = self.get(col, y).cloned().unwrap_or_default();
            cell.content = Cell::from_grapheme(g).content;
            cell.flags = style.flags;
            if let Some(fg) = style.fg {
                cell.fg = fg;
            }
            if let Some(bg) = style.bg {
                cell.bg = bg;
            }
            self.set(col, y, cell);
            col += w;
        }
        col
    }

    /// Write `text` at `(x, y)` clipped to the buffer width.
    pub fn set_string(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        self.set_stringn(x, y, text, self.width, style)
    }

    /// Text of row `y` with trailing blanks trimmed.
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = usize::from(y) * usize::from(self.width);
        let row = &self.cells[start..start + usize::from(self.width)];
        let mut out: String = row.iter().map(|c| c.symbol()).collect();
        out.truncate(out.trim_end().len());
        out
    }

    /// Whether two buffers have identical content and styles.
    pub fn content_eq(&self, other: &Buffer) -> bool {
        self == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::PackedRgba;

    #[test]
    fn set_string_clips() {
        let mut buf = Buffer::new(5, 1);
        let end = buf.set_string(0, 0, "abcdefgh", Style::new());
        assert_eq!(end, 5);
        assert_eq!(buf.row_text(0), "abcde");
    }

    #[test]
    fn wide_grapheme_writes_continuation() {
        let mut buf = Buffer::new(6, 1);
        let end = buf.set_string(0, 0, "🔥ok", Style::new());
        assert_eq!(end, 4);
        assert!(buf.get(1, 0).is_some_and(Cell::is_continuation));
        assert_eq!(buf.row_text(0), "🔥ok");
    }

    #[test]
    fn wide_grapheme_not_split_at_edge() {
        let mut buf = Buffer::new(3, 1);
        let end = buf.set_string(1, 0, "a🔥", Style::new());
        assert_eq!(end, 2);
        assert_eq!(buf.row_text(0), " a");
    }

    #[test]
    fn overwrite_continuation_clears_lead() {
        let mut buf = Buffer::new(4, 1);
        buf.set_string(0, 0, "🔥", Style::new());
        buf.set_string(1, 0, "x", Style::new());
        assert_eq!(buf.row_text(0), " x");
    }

    #[test]
    fn background_shows_through() {
        let mut buf = Buffer::new(4, 1);
        let panel = PackedRgba::hex(0x161B22);
        buf.fill(buf.area(), &Cell::default().with_bg(panel));
        buf.set_string(0, 0, "hi", Style::new().fg(PackedRgba::WHITE));
        let c = buf.get(0, 0).cloned().unwrap_or_default();
        assert_eq!(c.bg, panel);
        assert_eq!(c.fg, PackedRgba::WHITE);
    }

    #[test]
    fn control_chars_skipped() {
        let mut buf = Buffer::new(8, 1);
        buf.set_string(0, 0, "a\nb", Style::new());
        assert_eq!(buf.row_text(0), "ab");
    }
}
