#![forbid(unsafe_code)]

//! Optional-field styles that layer onto cells.
//!
//! `None` fields leave the underlying cell untouched, so a style can tint
//! text without clearing a panel background painted earlier.

use crate::cell::{Cell, PackedRgba, StyleFlags};

/// Foreground, background and attribute overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground override.
    pub fg: Option<PackedRgba>,
    /// Background override.
    pub bg: Option<PackedRgba>,
    /// Attributes to add.
    pub flags: StyleFlags,
}

impl Style {
    /// Empty style (changes nothing).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            flags: StyleFlags::empty(),
        }
    }

    /// Set the foreground.
    #[must_use]
    pub const fn fg(mut self, color: PackedRgba) -> Self {
        self.fg = Some(color);
        self
    }

    /// Set the background.
    #[must_use]
    pub const fn bg(mut self, color: PackedRgba) -> Self {
        self.bg = Some(color);
        self
    }

    /// Add bold.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.flags |= StyleFlags::BOLD;
        self
    }

    /// Add italic.
    #[must_use]
    pub fn italic(mut self) -> Self {
        self.flags |= StyleFlags::ITALIC;
        self
    }

    /// Add dim.
    #[must_use]
    pub fn dim(mut self) -> Self {
        self.flags |= StyleFlags::DIM;
        self
    }

    /// Add underline.
    #[must_use]
    pub fn underline(mut self) -> Self {
        self.flags |= StyleFlags::UNDERLINE;
        self
    }

    /// Add reverse video.
    #[must_use]
    pub fn reverse(mut self) -> Self {
        self.flags |= StyleFlags::REVERSE;
        self
    }

    /// `other` layered on top of `self`.
    #[must_use]
    pub fn patch(self, other: Style) -> Self {
        Self {
            fg: other.fg.or(self.fg),
            bg: other.bg.or(self.bg),
            flags: self.flags | other.flags,
        }
    }

    /// Apply to a cell in place.
    pub fn apply(&self, cell: &mut Cell) {
        if let Some(fg) = self.fg {
            cell.fg = fg;
        }
        if let Some(bg) = self.bg {
            cell.bg = bg;
        }
        cell.flags |= self.flags;
    }
}
