#![forbid(unsafe_code)]

//! State-tracked ANSI presenter.
//!
//! Keeps the previously presented buffer and emits only cells that changed,
//! tracking cursor position and the active SGR state so unchanged styles and
//! contiguous runs cost nothing extra. A size change forces a full repaint.

use std::io::{self, BufWriter, Write};

use crate::ansi;
use crate::buffer::Buffer;
use crate::cell::{Cell, PackedRgba, StyleFlags};
#[cfg(feature = "tracing")]
use ontos_core::logging::trace;

const BUFFER_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: PackedRgba,
    bg: PackedRgba,
    flags: StyleFlags,
}

impl CellStyle {
    fn from_cell(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            flags: cell.flags,
        }
    }
}

/// Writes buffers to a terminal as minimal ANSI diffs.
pub struct Presenter<W: Write> {
    writer: BufWriter<W>,
    previous: Option<Buffer>,
    current_style: Option<CellStyle>,
    cursor: Option<(u16, u16)>,
    sync_output: bool,
}

impl<W: Write> Presenter<W> {
    /// A presenter that knows nothing about the screen yet.
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(BUFFER_CAPACITY, writer),
            previous: None,
            current_style: None,
            cursor: None,
            sync_output: true,
        }
    }

    /// Enable or disable DEC 2026 synchronized output brackets.
    #[must_use]
    pub fn with_sync_output(mut self, enabled: bool) -> Self {
        self.sync_output = enabled;
        self
    }

    /// Forget the previous frame so the next present repaints everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
        self.current_style = None;
        self.cursor = None;
    }

    /// Present `buffer`, writing only what changed since the last call.
    ///
    /// Returns the number of cells emitted.
    pub fn present(&mut self, buffer: &Buffer) -> io::Result<usize> {
        if self
            .previous
            .as_ref()
            .is_some_and(|p| p.width() != buffer.width() || p.height() != buffer.height())
        {
            self.invalidate();
        }

        if self.sync_output {
            ansi::sync_begin(&mut self.writer)?;
        }

        let mut emitted = 0;
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                let Some(cell) = buffer.get(x, y) else {
                    continue;
                };
                let unchanged = self
                    .previous
                    .as_ref()
                    .and_then(|p| p.get(x, y))
                    .is_some_and(|old| old == cell);
                if unchanged || cell.is_continuation() {
                    continue;
                }
                self.emit_cell(x, y, cell)?;
                emitted += 1;
            }
        }

        ansi::sgr_reset(&mut self.writer)?;
        self.current_style = None;
        if self.sync_output {
            ansi::sync_end(&mut self.writer)?;
        }
        self.writer.flush()?;

        #[cfg(feature = "tracing")]
        trace!(cells = emitted, "frame presented");
        self.previous = Some(buffer.clone());
        Ok(emitted)
    }

    fn emit_cell(&mut self, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        if self.cursor != Some((x, y)) {
            ansi::cup(&mut self.writer, y, x)?;
        }

        let style = CellStyle::from_cell(cell);
        if self.current_style != Some(style) {
            ansi::sgr_reset(&mut self.writer)?;
            ansi::sgr_fg_packed(&mut self.writer, style.fg)?;
            ansi::sgr_bg_packed(&mut self.writer, style.bg)?;
            ansi::sgr_flags(&mut self.writer, style.flags)?;
            self.current_style = Some(style);
        }

        self.writer.write_all(cell.symbol().as_bytes())?;
        let advance = u16::try_from(cell.width()).unwrap_or(1);
        self.cursor = Some((x.saturating_add(advance), y));
        Ok(())
    }

    /// Write raw bytes (title changes, clipboard sequences).
    pub fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    fn present_twice(a: &Buffer, b: &Buffer) -> (usize, String) {
        let mut p = Presenter::new(Vec::new()).with_sync_output(false);
        p.present(a).unwrap();
        let n = p.present(b).unwrap();
        let out = p.into_inner().unwrap();
        (n, String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn first_frame_paints_everything() {
        let buf = Buffer::new(3, 2);
        let mut p = Presenter::new(Vec::new());
        assert_eq!(p.present(&buf).unwrap(), 6);
    }

    #[test]
    fn unchanged_frame_emits_nothing() {
        let mut buf = Buffer::new(4, 1);
        buf.set_string(0, 0, "abcd", Style::new());
        let (n, _) = present_twice(&buf, &buf);
        assert_eq!(n, 0);
    }

    #[test]
    fn only_changed_cells_emitted() {
        let mut a = Buffer::new(4, 1);
        a.set_string(0, 0, "abcd", Style::new());
        let mut b = a.clone();
        b.set_string(2, 0, "X", Style::new());
        let (n, out) = present_twice(&a, &b);
        assert_eq!(n, 1);
        assert!(out.ends_with("\x1b[1;3H\x1b[0m\x1b[39m\x1b[49mX\x1b[0m"));
    }

    #[test]
    fn resize_forces_repaint() {
        let mut p = Presenter::new(Vec::new());
        p.present(&Buffer::new(2, 1)).unwrap();
        assert_eq!(p.present(&Buffer::new(3, 1)).unwrap(), 3);
    }

    #[test]
    fn wide_cell_skips_continuation() {
        let mut buf = Buffer::new(3, 1);
        buf.set_string(0, 0, "🔥", Style::new());
        let mut p = Presenter::new(Vec::new());
        assert_eq!(p.present(&buf).unwrap(), 2);
    }
}
