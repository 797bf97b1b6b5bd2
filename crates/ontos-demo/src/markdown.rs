#![forbid(unsafe_code)]

//! The small markdown subset used by agent answers.
//!
//! Line rules, checked in order:
//! - a line starting with `[` is a row of action chips (`[Execute Hedge]`);
//! - `1. ` style lines are indented one column;
//! - `- ` lines become `• ` bullets indented two columns;
//! - blank lines are spacers;
//! - everything else is a text line.
//!
//! Inline, `**bold**` is the only markup. An unterminated `**` (as seen
//! mid-typing) is shown literally.

use ontos_render::style::Style;
use ontos_render::text::{Line, Span, wrap_line};
use ontos_render::display_width;

use crate::theme;

/// One source line, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MdBlock {
    Text(Line),
    Numbered(Line),
    Bullet(Line),
    Spacer,
    Chips(Vec<String>),
}

/// Classify every line of `text`.
pub fn parse(text: &str) -> Vec<MdBlock> {
    let base = theme::fg(theme::TEXT);
    text.split('\n')
        .map(|line| {
            if line.starts_with('[') {
                MdBlock::Chips(chips(line))
            } else if is_numbered(line) {
                MdBlock::Numbered(inline(line, base))
            } else if let Some(rest) = line.strip_prefix("- ") {
                MdBlock::Bullet(inline(&format!("• {rest}"), base))
            } else if line.trim().is_empty() {
                MdBlock::Spacer
            } else {
                MdBlock::Text(inline(line, base))
            }
        })
        .collect()
}

fn is_numbered(line: &str) -> bool {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0
        && line[digits..].starts_with('.')
        && line[digits + 1..].starts_with(char::is_whitespace)
}

/// Labels of every `[label]` in the line.
fn chips(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = line;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else {
            break;
        };
        if close > 0 {
            out.push(after[..close].to_string());
        }
        rest = &after[close + 1..];
    }
    out
}

/// Split `**bold**` runs out of `text`.
pub fn inline(text: &str, base: Style) -> Line {
    let bold = base.bold();
    let mut out = Line::new();
    let mut rest = text;
    while let Some(open) = rest.find("**") {
        let inner = &rest[open + 2..];
        match inner.find("**") {
            Some(close) if close > 0 && !inner[..close].contains('*') => {
                out.push(&rest[..open], base);
                out.push(&inner[..close], bold);
                rest = &inner[close + 2..];
            }
            _ => {
                out.push(&rest[..open + 2], base);
                rest = inner;
            }
        }
    }
    out.push(rest, base);
    merge_adjacent(out)
}

fn merge_adjacent(line: Line) -> Line {
    let mut merged = Line::new();
    for span in line.spans {
        match merged.spans.last_mut() {
            Some(last) if last.style == span.style => last.text.push_str(&span.text),
            _ => merged.spans.push(span),
        }
    }
    merged
}

/// Lay blocks out as display rows at `width` columns.
pub fn layout(blocks: &[MdBlock], width: u16) -> Vec<Line> {
    let mut rows = Vec::new();
    for block in blocks {
        match block {
            MdBlock::Text(line) => rows.extend(indented(line, 0, width)),
            MdBlock::Numbered(line) => rows.extend(indented(line, 1, width)),
            MdBlock::Bullet(line) => rows.extend(indented(line, 2, width)),
            MdBlock::Spacer => rows.push(Line::new()),
            MdBlock::Chips(labels) => {
                rows.push(Line::new());
                rows.extend(chip_rows(labels, width, chip_style()));
            }
        }
    }
    rows
}

fn indented(line: &Line, indent: u16, width: u16) -> Vec<Line> {
    let avail = width.saturating_sub(indent).max(1);
    wrap_line(line, usize::from(avail))
        .into_iter()
        .map(|mut row| {
            if indent > 0 {
                row.spans
                    .insert(0, Span::raw(" ".repeat(usize::from(indent))));
            }
            row
        })
        .collect()
}

/// Chips flow left to right, wrapping onto new rows.
pub fn chip_rows<S: AsRef<str>>(labels: &[S], width: u16, style: Style) -> Vec<Line> {
    let width = usize::from(width);
    let mut rows = Vec::new();
    let mut row = Line::new();
    let mut used = 0;
    for label in labels {
        let chip = format!(" {} ", label.as_ref());
        let w = display_width(&chip);
        if used > 0 && used + 1 + w > width {
            rows.push(std::mem::take(&mut row));
            used = 0;
        }
        if used > 0 {
            row.push(" ", Style::new());
            used += 1;
        }
        row.push(chip, style);
        used += w;
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

pub fn chip_style() -> Style {
    Style::new()
        .fg(theme::ACCENT)
        .bg(theme::tint(theme::ACCENT, 0.12))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Style {
        theme::fg(theme::TEXT)
    }

    #[test]
    fn bold_runs_are_split_out() {
        let line = inline("Confidence: **0.94**.", base());
        assert_eq!(line.plain(), "Confidence: 0.94.");
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[1].text, "0.94");
        assert_eq!(line.spans[1].style, base().bold());
    }

    #[test]
    fn unterminated_bold_is_literal() {
        let line = inline("Confidence: **0.9", base());
        assert_eq!(line.plain(), "Confidence: **0.9");
        assert_eq!(line.spans.len(), 1);
    }

    #[test]
    fn classifies_lines() {
        let blocks = parse("intro\n\n1. first\n- point\n[A] [B C]");
        assert!(matches!(blocks[0], MdBlock::Text(_)));
        assert_eq!(blocks[1], MdBlock::Spacer);
        assert!(matches!(blocks[2], MdBlock::Numbered(_)));
        match &blocks[3] {
            MdBlock::Bullet(l) => assert_eq!(l.plain(), "• point"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(blocks[4], MdBlock::Chips(vec!["A".into(), "B C".into()]));
    }

    #[test]
    fn numbered_needs_dot_and_space() {
        assert!(is_numbered("12. x"));
        assert!(!is_numbered("1.5σ"));
        assert!(!is_numbered(". x"));
    }

    #[test]
    fn layout_indents_and_wraps() {
        let rows = layout(&parse("1. alpha beta gamma"), 10);
        assert!(rows.len() > 1);
        assert!(rows.iter().all(|r| r.plain().starts_with(' ')));
        assert!(rows.iter().all(|r| r.width() <= 10));
    }

    #[test]
    fn chips_wrap_to_width() {
        let rows = chip_rows(&["Execute Hedge", "Export to OMS"], 20, chip_style());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].plain(), " Execute Hedge ");
    }
}
