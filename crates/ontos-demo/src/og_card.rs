#![forbid(unsafe_code)]

//! The 1200×630 link-preview card, rendered as SVG from constants.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use crate::fixtures::{CARD_STATS, PAGE_TITLE};
use crate::theme;

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 630;

const TITLE: &str = "Ontos × SentimenTrader";
const SUBTITLE: &str = "Compiled Reasoning for Financial Markets";
const TITLE_COLOR: &str = "#F9FAFB";
/// Horizontal distance between stat centers.
const STAT_PITCH: u32 = 198;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Font settings for one `<text>` element.
#[derive(Clone, Copy)]
struct Font {
    size: u32,
    bold: bool,
    mono: bool,
}

const fn font(size: u32, bold: bool) -> Font {
    Font {
        size,
        bold,
        mono: false,
    }
}

fn text(svg: &mut String, x: u32, y: u32, font: Font, color: &str, content: &str) {
    let weight = if font.bold { " font-weight=\"700\"" } else { "" };
    let family = if font.mono { "monospace" } else { "sans-serif" };
    let _ = writeln!(
        svg,
        "  <text x=\"{x}\" y=\"{y}\" font-family=\"{family}\" font-size=\"{}\"{weight} fill=\"{color}\" text-anchor=\"middle\">{}</text>",
        font.size,
        escape(content)
    );
}

/// The card as an SVG document.
pub fn svg() -> String {
    let mut svg = String::new();
    let cx = WIDTH / 2;
    let bg = theme::BG.to_hex_string();
    let accent = theme::ACCENT.to_hex_string();

    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" viewBox=\"0 0 {WIDTH} {HEIGHT}\">"
    );
    let _ = writeln!(svg, "  <title>{}</title>", escape(PAGE_TITLE));
    let _ = writeln!(
        svg,
        "  <defs>\n    <radialGradient id=\"glow\" cx=\"50%\" cy=\"50%\" r=\"50%\">\n      <stop offset=\"0%\" stop-color=\"{accent}\" stop-opacity=\"0.15\"/>\n      <stop offset=\"70%\" stop-color=\"{accent}\" stop-opacity=\"0\"/>\n    </radialGradient>\n  </defs>"
    );
    let _ = writeln!(svg, "  <rect width=\"{WIDTH}\" height=\"{HEIGHT}\" fill=\"{bg}\"/>");
    let _ = writeln!(
        svg,
        "  <rect x=\"{}\" y=\"63\" width=\"800\" height=\"400\" fill=\"url(#glow)\"/>",
        cx - 400
    );

    let logo_top = 181;
    let _ = writeln!(
        svg,
        "  <rect x=\"{}\" y=\"{logo_top}\" width=\"64\" height=\"64\" rx=\"14\" fill=\"{accent}\"/>",
        cx - 32
    );
    text(&mut svg, cx, logo_top + 43, font(32, true), "#FFFFFF", "O");
    text(&mut svg, cx, logo_top + 128, font(48, true), TITLE_COLOR, TITLE);
    let sub = theme::TEXT_SEC.to_hex_string();
    text(&mut svg, cx, logo_top + 170, font(22, false), &sub, SUBTITLE);

    let label_color = theme::TEXT_TER.to_hex_string();
    let count = u32::try_from(CARD_STATS.len()).unwrap_or(1);
    let first = cx - STAT_PITCH * (count - 1) / 2;
    for (i, stat) in (0u32..).zip(CARD_STATS.iter()) {
        let x = first + STAT_PITCH * i;
        let color = stat.color.color().to_hex_string();
        text(&mut svg, x, logo_top + 244, font(36, true), &color, stat.value);
        let mono = Font {
            mono: true,
            ..font(14, false)
        };
        text(&mut svg, x, logo_top + 266, mono, &label_color, stat.label);
    }
    svg.push_str("</svg>\n");
    svg
}

/// Write the card to `path`.
pub fn write(path: &Path) -> io::Result<()> {
    fs::write(path, svg())?;
    info!(path = %path.display(), "preview card written");
    Ok(())
}
