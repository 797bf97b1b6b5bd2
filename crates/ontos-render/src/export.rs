#![forbid(unsafe_code)]

//! Buffer readback for snapshots and assertions.

use crate::buffer::Buffer;
use crate::display_width;

/// Convert a buffer to plain text, one line per row, trailing blanks trimmed.
pub fn buffer_to_text(buf: &Buffer) -> String {
    let mut out = String::with_capacity((usize::from(buf.width()) + 1) * usize::from(buf.height()));
    for y in 0..buf.height() {
        if y > 0 {
            out.push('\n');
        }
        out.push_str(&buf.row_text(y));
    }
    out
}

/// Cell position of the first occurrence of `needle`, scanning row by row.
///
/// The column accounts for wide graphemes before the match.
pub fn find_text(buf: &Buffer, needle: &str) -> Option<(u16, u16)> {
    (0..buf.height()).find_map(|y| {
        let row = buf.row_text(y);
        row.find(needle).map(|byte| {
            let col = display_width(&row[..byte]);
            (u16::try_from(col).unwrap_or(u16::MAX), y)
        })
    })
}
