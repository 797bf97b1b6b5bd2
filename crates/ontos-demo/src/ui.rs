#![forbid(unsafe_code)]

//! Drawing helpers shared by the phase views and the chrome.
//!
//! Every helper draws at an explicit position and returns the rows it used,
//! so views stack sections top to bottom with a running `y`.

use ontos_core::geometry::{Rect, Sides};
use ontos_render::cell::PackedRgba;
use ontos_render::display_width;
use ontos_render::frame::{Frame, HitData, HitId};
use ontos_render::style::Style;
use ontos_render::text::{Line, center_offset};
use ontos_render::widgets::{Block, BorderType, Paragraph, Widget};
use ontos_render::widgets::paragraph::Alignment;

use crate::fixtures::{Emphasis, Fragment, HEADLINES, Stat};
use crate::theme;

/// Clickable regions. Phase views only ever register [`hit::PHASE`] and
/// interpret its data themselves.
pub mod hit {
    use ontos_render::frame::HitId;

    /// Header tab; data is the phase index.
    pub const TAB: HitId = HitId::new(1);
    pub const AUTO: HitId = HitId::new(2);
    pub const RESTART: HitId = HitId::new(3);
    pub const NEXT: HitId = HitId::new(4);
    /// Footer dot; data is the phase index.
    pub const DOT: HitId = HitId::new(5);
    pub const RETRY: HitId = HitId::new(6);
    /// Phase-local action; data is defined by the phase.
    pub const PHASE: HitId = HitId::new(7);
}

/// Layout facts a view needs besides its width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewCtx {
    /// Narrow terminal: stack columns, shorten labels.
    pub compact: bool,
}

/// Style for an emphasized fragment on top of `base`.
pub fn emphasis_style(emphasis: Emphasis, base: Style) -> Style {
    match emphasis {
        Emphasis::Plain => base,
        Emphasis::Strong => base.fg(theme::TEXT).bold(),
        Emphasis::Alert => base.fg(theme::RED).bold(),
        Emphasis::Accent => base.fg(theme::ACCENT),
        Emphasis::Success => base.fg(theme::GREEN),
    }
}

/// A sentence assembled from emphasized fragments.
pub fn fragments(parts: &[Fragment], base: Style) -> Line {
    let mut line = Line::new();
    for &(text, emphasis) in parts {
        line.push(text, emphasis_style(emphasis, base));
    }
    line
}

/// Wrap `lines` into `width` columns at `(x, y)`. Returns rows used.
pub fn wrapped(frame: &mut Frame, x: u16, y: u16, width: u16, lines: Vec<Line>) -> u16 {
    let para = Paragraph::new(lines).wrap(true);
    let height = para.height(width);
    para.render(Rect::new(x, y, width, height), frame);
    height
}

/// Like [`wrapped`], each row centered.
pub fn wrapped_centered(frame: &mut Frame, x: u16, y: u16, width: u16, lines: Vec<Line>) -> u16 {
    let para = Paragraph::new(lines)
        .wrap(true)
        .alignment(Alignment::Center);
    let height = para.height(width);
    para.render(Rect::new(x, y, width, height), frame);
    height
}

/// Draw one line centered in `[x, x + width)`.
pub fn centered(frame: &mut Frame, x: u16, y: u16, width: u16, line: &Line) {
    let col = x + center_offset(width, line.width());
    line.render(&mut frame.buffer, col, y, x + width, Style::new());
}

/// `PHASE n`, the headline and an optional intro paragraph.
pub fn phase_header(frame: &mut Frame, width: u16, index: usize, intro: Option<&str>) -> u16 {
    let mut y = 0;
    frame.buffer.set_string(
        0,
        y,
        &format!("PHASE {}", index + 1),
        theme::eyebrow(theme::ACCENT),
    );
    y += 2;
    let headline = HEADLINES.get(index).copied().unwrap_or_default();
    y += wrapped(
        frame,
        0,
        y,
        width,
        vec![Line::styled(headline, theme::heading())],
    );
    y += 1;
    if let Some(intro) = intro {
        y += wrapped(frame, 0, y, width, vec![Line::styled(intro, theme::body())]);
        y += 1;
    }
    y
}

/// Bordered panel; returns the content area.
pub fn panel(frame: &mut Frame, area: Rect, border: PackedRgba) -> Rect {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(theme::fg(border))
        .style(theme::panel())
        .padding(Sides::horizontal(theme::SM));
    block.render(area, frame);
    block.inner(area)
}

/// Panel title row: three window dots, a file name, and a right-aligned
/// status. Fills `area` (one row) with the elevated color.
pub fn window_bar(frame: &mut Frame, area: Rect, title: &str, status: Option<&Line>) {
    frame.fill_bg(area, Style::new().bg(theme::ELEVATED));
    let mut line = Line::new()
        .span("●", theme::fg(theme::RED))
        .span(" ", Style::new())
        .span("●", theme::fg(theme::AMBER))
        .span(" ", Style::new())
        .span("●", theme::fg(theme::GREEN))
        .span("  ", Style::new());
    line.push(title, theme::body());
    let end = line.render(&mut frame.buffer, area.x + 1, area.y, area.right(), Style::new());

    if let Some(status) = status {
        let w = u16::try_from(status.width()).unwrap_or(u16::MAX);
        let x = area.right().saturating_sub(w + 1);
        if x > end {
            status.render(&mut frame.buffer, x, area.y, area.right(), Style::new());
        }
    }
}

/// Rows a [`card`] of `lines` needs at `width`, borders included.
pub fn card_height(lines: &[Line], width: u16) -> u16 {
    let inner = width.saturating_sub(2 + 2 * theme::SM);
    Paragraph::new(lines.to_vec()).wrap(true).height(inner) + 2
}

/// Bordered panel with wrapped text inside.
pub fn card(frame: &mut Frame, area: Rect, border: PackedRgba, lines: Vec<Line>, align: Alignment) {
    let inner = panel(frame, area, border);
    Paragraph::new(lines)
        .wrap(true)
        .alignment(align)
        .render(inner, frame);
}

/// Copy the rows of `src` that end at `used` into `dest`: the newest
/// content of a transcript that is taller than its panel.
pub fn blit_tail(frame: &mut Frame, src: &Frame, used: u16, dest: Rect) {
    let top = used.saturating_sub(dest.height);
    frame.blit_rows(src, top, dest);
}

/// A one-row button. Registers `id`/`data` over its cells.
pub fn button(
    frame: &mut Frame,
    x: u16,
    y: u16,
    label: &str,
    style: Style,
    id: HitId,
    data: HitData,
) -> Rect {
    let text = format!("  {label}  ");
    let end = frame.buffer.set_string(x, y, &text, style);
    let rect = Rect::new(x, y, end.saturating_sub(x), 1);
    frame.register_hit(rect, id, data);
    rect
}

/// Width a [`button`] with `label` occupies.
pub fn button_width(label: &str) -> u16 {
    u16::try_from(display_width(label) + 4).unwrap_or(u16::MAX)
}

/// A button centered in `[x, x + width)`.
pub fn centered_button(
    frame: &mut Frame,
    x: u16,
    y: u16,
    width: u16,
    label: &str,
    style: Style,
    data: HitData,
) -> Rect {
    let bw = button_width(label);
    let col = x + width.saturating_sub(bw) / 2;
    button(frame, col, y, label, style, hit::PHASE, data)
}

/// Row of stat tiles: four across, two when compact. Returns rows used.
pub fn stat_tiles(frame: &mut Frame, y: u16, width: u16, stats: &[Stat], compact: bool) -> u16 {
    let tiles: Vec<(String, &str, PackedRgba)> = stats
        .iter()
        .map(|s| (s.value.to_string(), s.label, s.color.color()))
        .collect();
    tiles_of(frame, y, width, &tiles, compact)
}

/// Stat tiles from owned values (animated counters).
pub fn tiles_of(
    frame: &mut Frame,
    y: u16,
    width: u16,
    tiles: &[(String, &str, PackedRgba)],
    compact: bool,
) -> u16 {
    const TILE_HEIGHT: u16 = 4;
    if tiles.is_empty() {
        return 0;
    }
    let per_row = if compact { 2 } else { tiles.len() as u16 };
    let mut rows = 0;
    for (r, chunk) in tiles.chunks(usize::from(per_row)).enumerate() {
        let top = y + r as u16 * (TILE_HEIGHT + 1);
        let row = Rect::new(0, top, width, TILE_HEIGHT);
        for (cell, (value, label, color)) in row.columns(per_row, theme::SM).into_iter().zip(chunk) {
            let block = Block::bordered()
                .border_style(theme::border())
                .style(theme::panel())
                .padding(Sides::horizontal(theme::XS));
            block.render(cell, frame);
            let inner = block.inner(cell);
            centered(
                frame,
                inner.x,
                inner.y,
                inner.width,
                &Line::styled(value.as_str(), theme::fg(*color).bold()),
            );
            centered(
                frame,
                inner.x,
                inner.y + 1,
                inner.width,
                &Line::styled(*label, theme::muted()),
            );
        }
        rows = top + TILE_HEIGHT - y;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ENGINE_STATS;
    use ontos_render::export::buffer_to_text;

    #[test]
    fn fragments_keep_text_and_emphasis() {
        let line = fragments(
            &[("a ", Emphasis::Plain), ("b", Emphasis::Alert)],
            theme::body(),
        );
        assert_eq!(line.plain(), "a b");
        assert_eq!(line.spans[1].style.fg, Some(theme::RED));
    }

    #[test]
    fn button_registers_its_cells() {
        let mut f = Frame::new(30, 2);
        let rect = button(&mut f, 2, 1, "Go", theme::ghost_button(), hit::NEXT, 9);
        assert_eq!(rect.width, 6);
        assert_eq!(f.hit_test(4, 1), Some((hit::NEXT, 9)));
        assert_eq!(f.hit_test(1, 1), None);
        assert_eq!(f.buffer.row_text(1), "    Go");
    }

    #[test]
    fn tiles_wrap_in_compact_layout() {
        let mut wide = Frame::new(80, 20);
        assert_eq!(stat_tiles(&mut wide, 0, 80, &ENGINE_STATS, false), 4);
        let mut narrow = Frame::new(40, 20);
        assert_eq!(stat_tiles(&mut narrow, 0, 40, &ENGINE_STATS, true), 9);
        let text = buffer_to_text(&narrow.buffer);
        assert!(text.contains("28,400"));
        assert!(text.contains("<1ms"));
    }

    #[test]
    fn window_bar_places_status_on_the_right() {
        let mut f = Frame::new(40, 1);
        let status = Line::styled("ok", theme::muted());
        let area = f.bounds();
        window_bar(&mut f, area, "file.onto", Some(&status));
        let row = f.buffer.row_text(0);
        assert!(row.starts_with(" ● ● ●  file.onto"));
        assert!(row.ends_with("ok"));
    }

    #[test]
    fn card_height_counts_borders_and_wrapping() {
        let lines = vec![Line::raw("one two three four five six")];
        assert_eq!(card_height(&lines, 100), 3);
        assert!(card_height(&lines, 16) > 3);
    }

    #[test]
    fn blit_tail_shows_newest_rows() {
        let mut src = Frame::new(10, 10);
        for y in 0..6 {
            src.buffer.set_string(0, y, &format!("row {y}"), Style::new());
        }
        let mut f = Frame::new(10, 3);
        let area = f.bounds();
        blit_tail(&mut f, &src, 6, area);
        assert_eq!(f.buffer.row_text(0), "row 3");
        assert_eq!(f.buffer.row_text(2), "row 5");
    }

    #[test]
    fn header_includes_headline_and_intro() {
        let mut f = Frame::new(60, 10);
        let used = phase_header(&mut f, 60, 2, Some("intro text"));
        let text = buffer_to_text(&f.buffer);
        assert!(text.contains("PHASE 3"));
        assert!(text.contains("The Yen Carry Trade Unwind"));
        assert!(text.contains("intro text"));
        assert_eq!(used, 6);
    }
}
