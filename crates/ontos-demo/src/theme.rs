#![forbid(unsafe_code)]

//! Design tokens and shared styles.
//!
//! # Palette
//!
//! | Token | Hex | Use |
//! |-------|-----|-----|
//! | `BG` | `#0A0E17` | page background |
//! | `SURFACE` | `#0D1117` | panels |
//! | `ELEVATED` | `#161B22` | panel title bars, user bubbles |
//! | `BORDER` | `#21262D` | borders, progress tracks |
//! | `TEXT` / `TEXT_SEC` / `TEXT_TER` | | primary, secondary, tertiary text |
//! | `ACCENT` | `#6366F1` | brand, active tab, primary buttons |
//! | `AETHER` | `#7C3AED` | partner badge, `.onto` keywords |
//!
//! # Spacing System
//!
//! | Token | Value | Use Case |
//! |-------|-------|----------|
//! | `XS` | 1 | Between inline elements, inside tiles |
//! | `SM` | 2 | Grid gaps, panel padding |
//! | `MD` | 3 | Tile padding, button padding |
//! | `LG` | 4 | Page gutter (compact layouts use `XS`) |

use ontos_render::cell::PackedRgba;
use ontos_render::style::Style;

pub const BG: PackedRgba = PackedRgba::hex(0x0A0E17);
pub const SURFACE: PackedRgba = PackedRgba::hex(0x0D1117);
pub const ELEVATED: PackedRgba = PackedRgba::hex(0x161B22);
pub const BORDER: PackedRgba = PackedRgba::hex(0x21262D);
pub const TEXT: PackedRgba = PackedRgba::hex(0xE6EDF3);
pub const TEXT_SEC: PackedRgba = PackedRgba::hex(0x8B949E);
pub const TEXT_TER: PackedRgba = PackedRgba::hex(0x484F58);
pub const ACCENT: PackedRgba = PackedRgba::hex(0x6366F1);
pub const AETHER: PackedRgba = PackedRgba::hex(0x7C3AED);
pub const GREEN: PackedRgba = PackedRgba::hex(0x3FB950);
pub const RED: PackedRgba = PackedRgba::hex(0xF85149);
pub const AMBER: PackedRgba = PackedRgba::hex(0xD29922);
pub const BLUE: PackedRgba = PackedRgba::hex(0x58A6FF);
pub const CYAN: PackedRgba = PackedRgba::hex(0x39D2C0);
/// Background of the scripted terminal.
pub const TERMINAL_BG: PackedRgba = PackedRgba::hex(0x010409);
pub const ON_ACCENT: PackedRgba = PackedRgba::WHITE;

pub const XS: u16 = 1;
pub const SM: u16 = 2;
pub const MD: u16 = 3;
pub const LG: u16 = 4;

/// Widest the phase content grows before it is centered.
pub const CONTENT_MAX_WIDTH: u16 = 116;

/// Below this many columns the layout collapses to a single column.
pub const COMPACT_BREAKPOINT: u16 = 100;

/// Named foreground colors referenced from fixture data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Text,
    TextSec,
    TextTer,
    Accent,
    Aether,
    Green,
    Red,
    Amber,
    Blue,
    Cyan,
}

impl Token {
    /// Resolved color.
    pub const fn color(self) -> PackedRgba {
        match self {
            Self::Text => TEXT,
            Self::TextSec => TEXT_SEC,
            Self::TextTer => TEXT_TER,
            Self::Accent => ACCENT,
            Self::Aether => AETHER,
            Self::Green => GREEN,
            Self::Red => RED,
            Self::Amber => AMBER,
            Self::Blue => BLUE,
            Self::Cyan => CYAN,
        }
    }
}

/// `color` washed over the surface, for tinted chips and callouts.
pub fn tint(color: PackedRgba, amount: f64) -> PackedRgba {
    SURFACE.mix(color, amount)
}

pub fn page() -> Style {
    Style::new().fg(TEXT).bg(BG)
}

pub fn panel() -> Style {
    Style::new().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::new().fg(BORDER)
}

pub fn fg(color: PackedRgba) -> Style {
    Style::new().fg(color)
}

pub fn body() -> Style {
    fg(TEXT_SEC)
}

pub fn muted() -> Style {
    fg(TEXT_TER)
}

/// Small caps-style label above a heading (`PHASE 2`).
pub fn eyebrow(color: PackedRgba) -> Style {
    fg(color).bold()
}

pub fn heading() -> Style {
    fg(TEXT).bold()
}

/// Filled button.
pub fn button(bg: PackedRgba) -> Style {
    Style::new().fg(ON_ACCENT).bg(bg).bold()
}

/// Outlined, low-emphasis button.
pub fn ghost_button() -> Style {
    Style::new().fg(TEXT_TER).bg(ELEVATED)
}
