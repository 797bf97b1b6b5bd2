#![forbid(unsafe_code)]

//! Frame = Buffer + hit grid for a render pass.
//!
//! The `Frame` is what `Model::view()` draws into. Besides the cell grid it
//! records clickable regions so mouse clicks can be routed back to the
//! widget that drew them.
//!
//! Tall content is drawn into an off-screen frame and copied into the
//! visible one with [`Frame::blit_rows`], which carries hit regions along.

use ontos_core::geometry::Rect;

use crate::buffer::Buffer;
use crate::cell::Cell;
use crate::style::Style;

/// Identifier for a clickable region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HitId(pub u32);

impl HitId {
    /// Create a new hit ID from a raw value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw ID value.
    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Opaque user data stored alongside a hit.
pub type HitData = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct HitCell {
    id: Option<HitId>,
    data: HitData,
}

/// Maps screen cells to the hit region registered last over them.
#[derive(Debug, Clone)]
pub struct HitGrid {
    width: u16,
    height: u16,
    cells: Vec<HitCell>,
}

impl HitGrid {
    /// An empty grid.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![HitCell::default(); usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    /// Register `rect` as region `id`; later registrations win on overlap.
    pub fn register(&mut self, rect: Rect, id: HitId, data: HitData) {
        let rect = rect.intersection(&Rect::from_size(self.width, self.height));
        if rect.is_empty() {
            return;
        }
        let hit = HitCell { id: Some(id), data };
        for y in rect.y..rect.bottom() {
            let row = usize::from(y) * usize::from(self.width);
            self.cells[row + usize::from(rect.x)..row + usize::from(rect.right())].fill(hit);
        }
    }

    /// Region at `(x, y)`, if any.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitData)> {
        let cell = self.cells.get(self.index(x, y)?)?;
        cell.id.map(|id| (id, cell.data))
    }

    /// Clear all regions.
    pub fn clear(&mut self) {
        self.cells.fill(HitCell::default());
    }
}

/// The render target handed to views.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Cell grid.
    pub buffer: Buffer,
    hits: HitGrid,
}

impl Frame {
    /// A blank frame.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            buffer: Buffer::new(width, height),
            hits: HitGrid::new(width, height),
        }
    }

    /// Width in columns.
    #[inline]
    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    /// Height in rows.
    #[inline]
    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    /// Full frame area.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.buffer.area()
    }

    /// Blank cells and forget hit regions.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.hits.clear();
    }

    /// Register a clickable region.
    pub fn register_hit(&mut self, rect: Rect, id: HitId, data: HitData) {
        self.hits.register(rect, id, data);
    }

    /// Region under `(x, y)`.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<(HitId, HitData)> {
        self.hits.hit_test(x, y)
    }

    /// Paint `rect` with a background color, erasing content.
    pub fn fill_bg(&mut self, rect: Rect, style: Style) {
        let mut cell = Cell::default();
        style.apply(&mut cell);
        self.buffer.fill(rect, &cell);
    }

    /// Copy rows `src_top..` of `src` into `dest`, hits included.
    ///
    /// Copies `dest.height` rows (fewer if `src` runs out) and
    /// `min(dest.width, src.width)` columns.
    pub fn blit_rows(&mut self, src: &Frame, src_top: u16, dest: Rect) {
        let dest = dest.intersection(&self.bounds());
        let cols = dest.width.min(src.width());
        for row in 0..dest.height {
            let sy = src_top.saturating_add(row);
            if sy >= src.height() {
                break;
            }
            let dy = dest.y + row;
            for col in 0..cols {
                let dx = dest.x + col;
                if let Some(cell) = src.buffer.get(col, sy) {
                    // Cells are copied raw; wide pairs stay paired because
                    // whole rows are copied together.
                    if let Some(slot) = self.buffer.get_mut(dx, dy) {
                        *slot = cell.clone();
                    }
                }
                if let (Some(si), Some(di)) = (src.hits.index(col, sy), self.hits.index(dx, dy)) {
                    self.hits.cells[di] = src.hits.cells[si];
                }
            }
        }
    }
}
