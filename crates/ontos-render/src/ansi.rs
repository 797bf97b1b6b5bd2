#![forbid(unsafe_code)]

//! ANSI escape sequence generation helpers.
//!
//! Pure byte-generation functions; state tracking lives in the presenter.
//!
//! | Category | Sequence | Description |
//! |----------|----------|-------------|
//! | CSI | `ESC [ n m` | SGR (Select Graphic Rendition) |
//! | CSI | `ESC [ row ; col H` | CUP (Cursor Position, 1-indexed) |
//! | CSI | `ESC [ ? 2026 h/l` | Synchronized Output |
//! | OSC | `ESC ] 0 ; title BEL` | Window title |

use std::io::{self, Write};

use crate::cell::{PackedRgba, StyleFlags};

/// SGR reset: `CSI 0 m`
pub const SGR_RESET: &[u8] = b"\x1b[0m";

/// Write SGR reset sequence.
#[inline]
pub fn sgr_reset<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(SGR_RESET)
}

/// Write SGR for every set flag (no reset first).
pub fn sgr_flags<W: Write>(w: &mut W, flags: StyleFlags) -> io::Result<()> {
    const CODES: [(StyleFlags, u8); 5] = [
        (StyleFlags::BOLD, 1),
        (StyleFlags::DIM, 2),
        (StyleFlags::ITALIC, 3),
        (StyleFlags::UNDERLINE, 4),
        (StyleFlags::REVERSE, 7),
    ];
    for (flag, code) in CODES {
        if flags.contains(flag) {
            write!(w, "\x1b[{code}m")?;
        }
    }
    Ok(())
}

/// True color foreground: `CSI 38;2;r;g;b m`. Transparent maps to default.
pub fn sgr_fg_packed<W: Write>(w: &mut W, color: PackedRgba) -> io::Result<()> {
    if color.a() == 0 {
        return w.write_all(b"\x1b[39m");
    }
    write!(w, "\x1b[38;2;{};{};{}m", color.r(), color.g(), color.b())
}

/// True color background: `CSI 48;2;r;g;b m`. Transparent maps to default.
pub fn sgr_bg_packed<W: Write>(w: &mut W, color: PackedRgba) -> io::Result<()> {
    if color.a() == 0 {
        return w.write_all(b"\x1b[49m");
    }
    write!(w, "\x1b[48;2;{};{};{}m", color.r(), color.g(), color.b())
}

/// CUP (Cursor Position) from 0-indexed coordinates.
pub fn cup<W: Write>(w: &mut W, row: u16, col: u16) -> io::Result<()> {
    write!(
        w,
        "\x1b[{};{}H",
        row.saturating_add(1),
        col.saturating_add(1)
    )
}

/// Begin synchronized output (DEC 2026).
pub fn sync_begin<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output (DEC 2026).
pub fn sync_end<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

/// Set the window title (OSC 0). Control characters are stripped.
pub fn set_title<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    let clean: String = title.chars().filter(|c| !c.is_control()).collect();
    write!(w, "\x1b]0;{clean}\x07")
}
