#![forbid(unsafe_code)]

//! Render kernel: cells, buffers, widgets, and ANSI presentation.
//!
//! Views draw into a [`Frame`](frame::Frame) (a [`Buffer`](buffer::Buffer)
//! plus a hit grid). The [`Presenter`](presenter::Presenter) diffs
//! consecutive buffers and writes the minimal ANSI stream; tests read the
//! buffer back through [`export::buffer_to_text`].

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod export;
pub mod frame;
pub mod presenter;
pub mod style;
pub mod text;
pub mod widgets;

mod text_width {
    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthStr;

    /// Width of one grapheme cluster in cells.
    #[inline]
    pub fn grapheme_width(grapheme: &str) -> usize {
        if grapheme.is_ascii() {
            return grapheme
                .bytes()
                .filter(|b| (0x20..=0x7E).contains(b))
                .count()
                .min(1);
        }
        grapheme.width().min(2)
    }

    /// Width of a string in cells.
    #[inline]
    pub fn display_width(text: &str) -> usize {
        if text.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
            return text.len();
        }
        text.graphemes(true).map(grapheme_width).sum()
    }
}

pub use text_width::{display_width, grapheme_width};
