#![forbid(unsafe_code)]

//! Cell rectangles and the splits the page layout needs.

/// An area of cells with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `width` x `height` at the origin.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// First column past the right edge.
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// First row below the bottom edge.
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlap of two rectangles; `Rect::default()` when they are disjoint.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let (left, top) = (self.x.max(other.x), self.y.max(other.y));
        let (right, bottom) = (self.right().min(other.right()), self.bottom().min(other.bottom()));
        if left >= right || top >= bottom {
            return Rect::default();
        }
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Shrink by `margin`, saturating at zero size.
    pub fn inner(&self, margin: Sides) -> Rect {
        Rect::new(
            self.x.saturating_add(margin.left),
            self.y.saturating_add(margin.top),
            self.width.saturating_sub(margin.horizontal_sum()),
            self.height.saturating_sub(margin.vertical_sum()),
        )
    }

    /// Take `rows` rows off the top; returns `(top, rest)`.
    pub fn split_top(&self, rows: u16) -> (Rect, Rect) {
        let rows = rows.min(self.height);
        (
            Rect::new(self.x, self.y, self.width, rows),
            Rect::new(self.x, self.y + rows, self.width, self.height - rows),
        )
    }

    /// Take `rows` rows off the bottom; returns `(rest, bottom)`.
    pub fn split_bottom(&self, rows: u16) -> (Rect, Rect) {
        let rows = rows.min(self.height);
        let rest = self.height - rows;
        (
            Rect::new(self.x, self.y, self.width, rest),
            Rect::new(self.x, self.y + rest, self.width, rows),
        )
    }

    /// Split into `count` columns of near-equal width separated by `gap` cells.
    ///
    /// Leftover cells go to the leading columns so the row is filled exactly.
    pub fn columns(&self, count: u16, gap: u16) -> Vec<Rect> {
        if count == 0 {
            return Vec::new();
        }
        let gaps = gap.saturating_mul(count - 1);
        let usable = self.width.saturating_sub(gaps);
        let base = usable / count;
        let extra = usable % count;

        let mut x = self.x;
        (0..count)
            .map(|i| {
                let w = base + u16::from(i < extra);
                let col = Rect::new(x, self.y, w, self.height);
                x = x.saturating_add(w).saturating_add(gap);
                col
            })
            .collect()
    }
}

/// Per-side padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Sides {
    /// Clockwise from the top.
    pub const fn new(top: u16, right: u16, bottom: u16, left: u16) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn all(n: u16) -> Self {
        Self::new(n, n, n, n)
    }

    /// Left and right only.
    pub const fn horizontal(n: u16) -> Self {
        Self::new(0, n, 0, n)
    }

    #[inline]
    pub const fn horizontal_sum(&self) -> u16 {
        self.left.saturating_add(self.right)
    }

    #[inline]
    pub const fn vertical_sum(&self) -> u16 {
        self.top.saturating_add(self.bottom)
    }
}
