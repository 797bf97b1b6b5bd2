#![forbid(unsafe_code)]

//! Styled text and width-correct wrapping.
//!
//! A [`Line`] is a sequence of styled [`Span`]s. Wrapping works on cell
//! widths and grapheme boundaries, so emoji and box-drawing glyphs are never
//! split. Words longer than the available width fall back to grapheme
//! breaks.
//!
//! ```
//! use ontos_render::text::wrap_text;
//!
//! let lines = wrap_text("Hello world foo bar", 10);
//! assert_eq!(lines, vec!["Hello", "world foo", "bar"]);
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::buffer::Buffer;
use crate::style::Style;
use crate::{display_width, grapheme_width};

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span {
    /// Text content.
    pub text: String,
    /// Style applied to the whole run.
    pub style: Style,
}

impl Span {
    /// Unstyled span.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::new(),
        }
    }

    /// Styled span.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        display_width(&self.text)
    }
}

/// One visual line made of spans.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    /// Spans in display order.
    pub spans: Vec<Span>,
}

impl Line {
    /// Empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Line with a single unstyled span.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            spans: vec![Span::raw(text)],
        }
    }

    /// Line with a single styled span.
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            spans: vec![Span::styled(text, style)],
        }
    }

    /// Append a span (builder).
    #[must_use]
    pub fn span(mut self, text: impl Into<String>, style: Style) -> Self {
        self.push(text, style);
        self
    }

    /// Append a span.
    pub fn push(&mut self, text: impl Into<String>, style: Style) {
        let text = text.into();
        if !text.is_empty() {
            self.spans.push(Span::styled(text, style));
        }
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.spans.iter().map(Span::width).sum()
    }

    /// Concatenated text without styles.
    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Whether the line has no visible text.
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|s| s.text.is_empty())
    }

    /// Draw at `(x, y)`, clipped at `max_x`. Returns the column after the text.
    pub fn render(&self, buf: &mut Buffer, x: u16, y: u16, max_x: u16, base: Style) -> u16 {
        let mut col = x;
        for span in &self.spans {
            col = buf.set_stringn(col, y, &span.text, max_x, base.patch(span.style));
            if col >= max_x {
                break;
            }
        }
        col
    }
}

impl From<&str> for Line {
    fn from(text: &str) -> Self {
        Line::raw(text)
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Line::raw(text)
    }
}

/// Word-wrap plain text to `width` cells. Explicit newlines are kept.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    text.split('\n')
        .flat_map(|para| {
            wrap_line(&Line::raw(para), width)
                .into_iter()
                .map(|l| l.plain())
        })
        .collect()
}

/// Word-wrap a styled line to `width` cells.
///
/// Trailing spaces at a break are dropped; words wider than `width` are
/// broken at grapheme boundaries. An empty input yields one empty line.
#[must_use]
pub fn wrap_line(line: &Line, width: usize) -> Vec<Line> {
    if width == 0 {
        return vec![line.clone()];
    }
    let mut out = Vec::new();
    let mut current = Line::new();
    let mut used = 0usize;

    for span in &line.spans {
        for word in span.text.split_inclusive(' ') {
            let trimmed = word.trim_end_matches(' ');
            let word_w = display_width(trimmed);
            let full_w = display_width(word);

            if used > 0 && used + word_w > width {
                trim_trailing_spaces(&mut current);
                out.push(std::mem::take(&mut current));
                used = 0;
            }

            if word_w > width {
                for g in word.graphemes(true) {
                    let gw = grapheme_width(g);
                    if used + gw > width && used > 0 {
                        trim_trailing_spaces(&mut current);
                        out.push(std::mem::take(&mut current));
                        used = 0;
                    }
                    append(&mut current, g, span.style);
                    used += gw;
                }
                continue;
            }

            append(&mut current, word, span.style);
            used += full_w;
        }
    }
    trim_trailing_spaces(&mut current);
    out.push(current);
    out
}

fn append(line: &mut Line, text: &str, style: Style) {
    match line.spans.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => line.push(text, style),
    }
}

fn trim_trailing_spaces(line: &mut Line) {
    while let Some(last) = line.spans.last_mut() {
        let trimmed = last.text.trim_end_matches(' ').len();
        last.text.truncate(trimmed);
        if last.text.is_empty() {
            line.spans.pop();
        } else {
            break;
        }
    }
}

/// Truncate to at most `max_width` cells on a grapheme boundary.
#[must_use]
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for g in text.graphemes(true) {
        let w = grapheme_width(g);
        if used + w > max_width {
            break;
        }
        out.push_str(g);
        used += w;
    }
    out
}

/// Truncate with a trailing ellipsis when the text does not fit.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max_width: usize, ellipsis: &str) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }
    let ew = display_width(ellipsis);
    if ew >= max_width {
        return truncate_to_width(text, max_width);
    }
    let mut out = truncate_to_width(text, max_width - ew);
    out.push_str(ellipsis);
    out
}

/// Column offset that centers `content_width` inside `width`.
#[inline]
pub fn center_offset(width: u16, content_width: usize) -> u16 {
    let cw = u16::try_from(content_width).unwrap_or(u16::MAX);
    width.saturating_sub(cw) / 2
}
