#![forbid(unsafe_code)]

//! Display-only treatment of `.onto` source: coloring and foldable sections.
//!
//! This is a line-oriented highlighter, not a parser. Each line is colored
//! on its own:
//!
//! | line | treatment |
//! |---|---|
//! | `// ...` | tertiary, italic |
//! | `@directive` | accent, bold |
//! | `rule`/`class`/`relationship`/`match`/`where`/`then`/`and` | keyword + following name highlighted |
//! | anything else | strings green, type names amber, numbers blue |

use ontos_render::style::Style;
use ontos_render::text::Line;

use crate::theme;

const TYPE_NAMES: [&str; 9] = [
    "String",
    "Float",
    "Integer",
    "List",
    "Map",
    "Enum",
    "Boolean",
    "TimeSeries",
    "Reference",
];

const DECLARATIONS: [&str; 3] = ["rule", "class", "relationship"];
const CLAUSES: [&str; 4] = ["match", "where", "then", "and"];
const SECTION_KEYWORDS: [&str; 4] = ["class", "rule", "@relationships", "@metadata"];

/// A block that can be collapsed to its header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSection {
    /// Header text without the opening brace (`class Sector`).
    pub name: String,
    /// Line index of the header.
    pub start: usize,
    /// Line index of the closing brace.
    pub end: usize,
}

impl FoldSection {
    /// Whether collapsing this section hides line `index`.
    pub fn hides(&self, index: usize) -> bool {
        index > self.start && index <= self.end
    }

    /// Lines hidden when collapsed.
    pub fn hidden_len(&self) -> usize {
        self.end - self.start
    }
}

/// Find top-level `class`, `rule`, `@relationships` and `@metadata` blocks.
///
/// A block ends on the first line after its header where the brace depth
/// returns to zero. Blocks never nest; an unterminated block is dropped.
pub fn fold_sections<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<FoldSection> {
    let mut out = Vec::new();
    let mut open: Option<(String, usize)> = None;
    let mut depth: i32 = 0;

    for (i, line) in lines.into_iter().enumerate() {
        let trimmed = line.trim();
        if open.is_none() && starts_section(trimmed) {
            let name = trimmed
                .split_once('{')
                .map_or(trimmed, |(head, _)| head)
                .trim_end()
                .to_string();
            open = Some((name, i));
            depth = 0;
        }
        let Some((_, start)) = &open else {
            continue;
        };
        let start = *start;
        depth += braces(line);
        if depth <= 0 && i > start
            && let Some((name, start)) = open.take()
        {
            out.push(FoldSection {
                name,
                start,
                end: i,
            });
        }
    }
    out
}

fn starts_section(trimmed: &str) -> bool {
    SECTION_KEYWORDS.iter().any(|kw| {
        trimmed
            .strip_prefix(kw)
            .is_some_and(|rest| !rest.starts_with(is_word_char))
    })
}

fn braces(line: &str) -> i32 {
    line.chars()
        .map(|c| match c {
            '{' => 1,
            '}' => -1,
            _ => 0,
        })
        .sum()
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Color one line of source.
pub fn highlight(line: &str) -> Line {
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") {
        return Line::styled(line, theme::muted().italic());
    }
    if trimmed.starts_with('@') {
        return Line::styled(line, theme::fg(theme::ACCENT).bold());
    }
    let first = trimmed.split_whitespace().next().unwrap_or_default();
    let followed_by_space = trimmed[first.len()..].starts_with(char::is_whitespace);
    if followed_by_space && (DECLARATIONS.contains(&first) || CLAUSES.contains(&first)) {
        return keyword_line(line, first);
    }
    let mut out = Line::new();
    literals(&mut out, line);
    out
}

/// `<indent><keyword> <name><rest>`: a keyword followed by a word gets the
/// declaration colors, a bare keyword (`then {`) the accent.
fn keyword_line(line: &str, keyword: &str) -> Line {
    let base = theme::body();
    let idx = line.find(keyword).unwrap_or(0);
    let (before, rest) = line.split_at(idx);
    let after = &rest[keyword.len()..];

    let mut out = Line::new();
    out.push(before, base);

    let gap = after.len() - after.trim_start().len();
    let name_len = after[gap..]
        .find(|c: char| !is_word_char(c))
        .unwrap_or(after.len() - gap);
    if gap > 0 && name_len > 0 {
        out.push(keyword, theme::fg(theme::AETHER).bold());
        out.push(&after[..gap], base);
        out.push(&after[gap..gap + name_len], theme::fg(theme::CYAN).bold());
        literals(&mut out, &after[gap + name_len..]);
    } else {
        out.push(keyword, theme::fg(theme::ACCENT).bold());
        literals(&mut out, after);
    }
    out
}

/// Strings, type names and numbers inside otherwise plain text.
fn literals(out: &mut Line, text: &str) {
    let base = theme::body();
    let mut plain = String::new();
    let mut chars = text.char_indices().peekable();
    let mut prev_word = false;

    while let Some((i, c)) = chars.next() {
        if c == '"' {
            let end = string_end(text, i);
            flush(out, &mut plain, base);
            out.push(&text[i..end], theme::fg(theme::GREEN));
            while chars.peek().is_some_and(|&(j, _)| j < end) {
                chars.next();
            }
            prev_word = false;
            continue;
        }
        if is_word_char(c) && !prev_word {
            let end = text[i..]
                .find(|ch: char| !is_word_char(ch) && ch != '.')
                .map_or(text.len(), |n| i + n);
            let word_end = text[i..]
                .find(|ch: char| !is_word_char(ch))
                .map_or(text.len(), |n| i + n);
            let (span_end, style) = if c.is_ascii_digit() {
                let number = text[i..end].trim_end_matches('.');
                (i + number.len(), Some(theme::fg(theme::BLUE)))
            } else if TYPE_NAMES.contains(&&text[i..word_end]) {
                (word_end, Some(theme::fg(theme::AMBER)))
            } else {
                (word_end, None)
            };
            match style {
                Some(style) => {
                    flush(out, &mut plain, base);
                    out.push(&text[i..span_end], style);
                }
                None => plain.push_str(&text[i..span_end]),
            }
            while chars.peek().is_some_and(|&(j, _)| j < span_end) {
                chars.next();
            }
            prev_word = text[..span_end].ends_with(is_word_char);
            continue;
        }
        plain.push(c);
        prev_word = is_word_char(c);
    }
    flush(out, &mut plain, base);
}

/// Byte index just past the closing quote of the string opening at `start`.
fn string_end(text: &str, start: usize) -> usize {
    let mut escaped = false;
    for (j, c) in text[start + 1..].char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return start + 1 + j + 1,
            _ => {}
        }
    }
    text.len()
}

fn flush(out: &mut Line, plain: &mut String, style: Style) {
    if !plain.is_empty() {
        out.push(std::mem::take(plain), style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ONTO_FILE;

    fn colors(line: &Line) -> Vec<(String, Option<ontos_render::cell::PackedRgba>)> {
        line.spans
            .iter()
            .map(|s| (s.text.clone(), s.style.fg))
            .collect()
    }

    #[test]
    fn finds_every_top_level_block() {
        let sections = fold_sections(ONTO_FILE.lines());
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "@metadata",
                "class Indicator",
                "class Sector",
                "class CurrencyPair",
                "class MarketRegime",
                "@relationships",
                "rule systemic_carry_unwind",
            ]
        );
        assert_eq!((sections[0].start, sections[0].end), (6, 12));
        assert_eq!(sections[6].end, 116);
    }

    #[test]
    fn nested_declarations_do_not_open_sections() {
        let src = "@relationships {\n  relationship a {\n  }\n}\nclass B {\n}";
        let sections = fold_sections(src.lines());
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].hidden_len(), 3);
        assert!(sections[0].hides(3));
        assert!(!sections[0].hides(0));
    }

    #[test]
    fn unterminated_block_is_dropped() {
        assert!(fold_sections("class A {\n  x: Float".lines()).is_empty());
    }

    #[test]
    fn keyword_prefix_needs_word_boundary() {
        assert!(fold_sections("classification {\n}".lines()).is_empty());
    }

    #[test]
    fn comments_and_directives() {
        let c = highlight("  // 1. The SentimenTrader Core Setup");
        assert_eq!(c.spans.len(), 1);
        assert_eq!(c.spans[0].style.fg, Some(theme::TEXT_TER));
        let d = highlight("@metadata {");
        assert_eq!(d.spans[0].style.fg, Some(theme::ACCENT));
    }

    #[test]
    fn declaration_keyword_and_name() {
        let l = highlight("rule systemic_carry_unwind {");
        assert_eq!(
            colors(&l),
            [
                ("rule".into(), Some(theme::AETHER)),
                (" ".into(), Some(theme::TEXT_SEC)),
                ("systemic_carry_unwind".into(), Some(theme::CYAN)),
                (" {".into(), Some(theme::TEXT_SEC)),
            ]
        );
    }

    #[test]
    fn bare_clause_uses_accent() {
        let l = highlight("  then {");
        assert_eq!(l.plain(), "  then {");
        assert!(l.spans.iter().any(|s| s.text == "then" && s.style.fg == Some(theme::ACCENT)));
    }

    #[test]
    fn literals_are_colored() {
        let l = highlight(r#"    pair            : String     // e.g. "JPY/USD""#);
        assert!(l.spans.iter().any(|s| s.text == "String" && s.style.fg == Some(theme::AMBER)));
        assert!(l.spans.iter().any(|s| s.text == "\"JPY/USD\"" && s.style.fg == Some(theme::GREEN)));

        let n = highlight("      .volatility_index(lookback: 10d) > 1.5_sigma");
        let blue: Vec<&str> = n
            .spans
            .iter()
            .filter(|s| s.style.fg == Some(theme::BLUE))
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(blue, ["10d", "1.5_sigma"]);
    }

    #[test]
    fn digits_inside_identifiers_stay_plain() {
        let l = highlight("  x86_value: 3100");
        let blue: Vec<&str> = l
            .spans
            .iter()
            .filter(|s| s.style.fg == Some(theme::BLUE))
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(blue, ["3100"]);
    }

    #[test]
    fn highlighting_preserves_text() {
        for line in ONTO_FILE.lines() {
            assert_eq!(highlight(line).plain(), line);
        }
    }
}
