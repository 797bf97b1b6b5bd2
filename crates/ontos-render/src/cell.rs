#![forbid(unsafe_code)]

//! Cells: one terminal grid position.
//!
//! A cell holds either nothing, a single grapheme cluster, or a
//! *continuation* marker for the trailing half of a wide grapheme. Colors
//! are straight RGBA; an alpha of zero means "terminal default".

use crate::grapheme_width;

/// 32-bit RGBA color (`0xRRGGBBAA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct PackedRgba(pub u32);

impl PackedRgba {
    /// Fully transparent (alpha = 0). Renders as the terminal default.
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create an opaque RGB color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create an RGBA color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Opaque color from a `0xRRGGBB` literal.
    #[inline]
    pub const fn hex(rgb: u32) -> Self {
        Self((rgb << 8) | 0xFF)
    }

    /// Red channel.
    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel.
    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Alpha channel.
    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Linear blend toward `other` by `t` in [0, 1]. Alpha is taken from `self`.
    pub fn mix(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Self::rgba(
            lerp(self.r(), other.r()),
            lerp(self.g(), other.g()),
            lerp(self.b(), other.b()),
            self.a(),
        )
    }

    /// `#rrggbb` form, as used in SVG output.
    pub fn to_hex_string(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r(), self.g(), self.b())
    }
}

bitflags::bitflags! {
    /// Cell style flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        /// Bold / increased intensity.
        const BOLD          = 0b0000_0001;
        /// Dim / decreased intensity.
        const DIM           = 0b0000_0010;
        /// Italic text.
        const ITALIC        = 0b0000_0100;
        /// Underlined text.
        const UNDERLINE     = 0b0000_1000;
        /// Reverse video.
        const REVERSE       = 0b0010_0000;
    }
}

/// What a cell displays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellContent {
    /// Blank (renders as a space).
    #[default]
    Empty,
    /// A single-codepoint grapheme.
    Char(char),
    /// A multi-codepoint grapheme cluster.
    Grapheme(Box<str>),
    /// Trailing half of a wide grapheme in the previous column.
    Continuation,
}

/// One grid position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    /// Displayed content.
    pub content: CellContent,
    /// Foreground color.
    pub fg: PackedRgba,
    /// Background color.
    pub bg: PackedRgba,
    /// Style flags.
    pub flags: StyleFlags,
}

impl Cell {
    /// A cell with one character and default colors.
    #[inline]
    pub fn from_char(ch: char) -> Self {
        Self {
            content: CellContent::Char(ch),
            ..Self::default()
        }
    }

    /// A cell holding a grapheme cluster.
    pub fn from_grapheme(g: &str) -> Self {
        let mut chars = g.chars();
        let content = match (chars.next(), chars.next()) {
            (None, _) => CellContent::Empty,
            (Some(c), None) => CellContent::Char(c),
            _ => CellContent::Grapheme(g.into()),
        };
        Self {
            content,
            ..Self::default()
        }
    }

    /// The continuation marker placed after a wide grapheme.
    #[inline]
    pub fn continuation() -> Self {
        Self {
            content: CellContent::Continuation,
            ..Self::default()
        }
    }

    /// Whether this is the trailing half of a wide grapheme.
    #[inline]
    pub fn is_continuation(&self) -> bool {
        self.content == CellContent::Continuation
    }

    /// Whether the cell shows nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content == CellContent::Empty
    }

    /// Text this cell contributes to a row (`" "` for blanks, `""` for continuations).
    pub fn symbol(&self) -> std::borrow::Cow<'_, str> {
        use std::borrow::Cow;
        match &self.content {
            CellContent::Empty => Cow::Borrowed(" "),
            CellContent::Char(c) => Cow::Owned(c.to_string()),
            CellContent::Grapheme(g) => Cow::Borrowed(&**g),
            CellContent::Continuation => Cow::Borrowed(""),
        }
    }

    /// Columns the cell occupies (2 for wide graphemes, 0 for continuations).
    pub fn width(&self) -> usize {
        match &self.content {
            CellContent::Empty => 1,
            CellContent::Char(c) => {
                let mut buf = [0u8; 4];
                grapheme_width(c.encode_utf8(&mut buf)).max(1)
            }
            CellContent::Grapheme(g) => grapheme_width(g).max(1),
            CellContent::Continuation => 0,
        }
    }

    /// Builder: set foreground.
    #[must_use]
    pub fn with_fg(mut self, fg: PackedRgba) -> Self {
        self.fg = fg;
        self
    }

    /// Builder: set background.
    #[must_use]
    pub fn with_bg(mut self, bg: PackedRgba) -> Self {
        self.bg = bg;
        self
    }
}
