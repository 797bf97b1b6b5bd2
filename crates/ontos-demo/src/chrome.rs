#![forbid(unsafe_code)]

//! Page chrome around the phase content: header with progress and tabs,
//! footer with navigation, and the loading splash.

use ontos_core::geometry::Rect;
use ontos_render::display_width;
use ontos_render::style::Style;
use ontos_render::text::Line;
use ontos_render::frame::{Frame, HitId};
use ontos_render::widgets::{ProgressBar, Widget};

use crate::controller::PHASE_COUNT;
use crate::fixtures::PHASES;
use crate::theme;
use crate::ui::{self, hit};

/// Progress row, brand row, tab row, rule.
pub const HEADER_ROWS: u16 = 4;
/// Rule and one row of controls.
pub const FOOTER_ROWS: u16 = 2;

const BRAND: &str = "Ontos";
const TAGLINE: &str = "Compiled Reasoning Engine";
const PARTNER: &str = "AETHER / SENTIMENTRADER";
const FOOTER_NOTE: &str = "Built with .onto — Compiled Reasoning Engine";
const SWIPE_HINT: &str = "← → or swipe";
const RESTART_LABEL: &str = "↺ Restart Demo";
pub const SPLASH_TEXT: &str = "Loading compiled graph...";

/// What the chrome needs to know about the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeState {
    pub index: usize,
    pub auto_advance: bool,
    pub compact: bool,
}

/// Label of the auto-advance toggle.
pub fn auto_label(on: bool) -> &'static str {
    if on { "▶ AUTO" } else { "⏸ AUTO" }
}

/// Tab text: numbered name, or just the number when compact.
pub fn tab_label(index: usize, compact: bool) -> String {
    if compact {
        format!("{}", index + 1)
    } else {
        format!("{}. {}", index + 1, PHASES[index].name)
    }
}

fn logo(frame: &mut Frame, x: u16, y: u16) -> u16 {
    frame.buffer.set_string(x, y, " O ", theme::button(theme::ACCENT))
}

/// Header across `area` (expects [`HEADER_ROWS`] rows).
pub fn header(frame: &mut Frame, area: Rect, state: ChromeState) {
    frame.fill_bg(area, theme::page());
    let ratio = (state.index + 1) as f64 / PHASE_COUNT as f64;
    ProgressBar::new(ratio)
        .colors(theme::ACCENT, theme::BORDER)
        .thin(true)
        .render(Rect::new(area.x, area.y, area.width, 1), frame);

    let pad = if state.compact { theme::SM } else { theme::LG };
    let left = area.x + pad;
    let right = area.right().saturating_sub(pad);
    let brand_y = area.y + 1;
    let mut x = logo(frame, left, brand_y) + 1;
    x = frame
        .buffer
        .set_string(x, brand_y, BRAND, theme::heading());
    if !state.compact {
        frame
            .buffer
            .set_string(x + 2, brand_y, TAGLINE, theme::muted());
    }

    let mut end = right;
    if !state.compact {
        let w = u16::try_from(display_width(PARTNER)).unwrap_or(0);
        end = end.saturating_sub(w);
        frame
            .buffer
            .set_string(end, brand_y, PARTNER, theme::fg(theme::AETHER));
        end = end.saturating_sub(2);
    }
    let label = auto_label(state.auto_advance);
    let style = if state.auto_advance {
        Style::new()
            .fg(theme::GREEN)
            .bg(theme::tint(theme::GREEN, 0.15))
    } else {
        theme::ghost_button()
    };
    let bw = ui::button_width(label);
    ui::button(frame, end.saturating_sub(bw), brand_y, label, style, hit::AUTO, 0);

    tabs(frame, Rect::new(left, area.y + 2, right.saturating_sub(left), 1), state);

    let rule = "─".repeat(usize::from(area.width));
    frame
        .buffer
        .set_string(area.x, area.y + 3, &rule, theme::border());
}

fn tabs(frame: &mut Frame, row: Rect, state: ChromeState) {
    let labels: Vec<String> = (0..PHASE_COUNT)
        .map(|i| tab_label(i, state.compact))
        .collect();
    let cells = if state.compact {
        row.columns(u16::try_from(PHASE_COUNT).unwrap_or(1), 1)
    } else {
        let mut x = row.x;
        labels
            .iter()
            .map(|label| {
                let w = ui::button_width(label);
                let cell = Rect::new(x, row.y, w, 1);
                x += w + 1;
                cell
            })
            .collect()
    };
    for (i, (cell, label)) in cells.into_iter().zip(&labels).enumerate() {
        let style = if i == state.index {
            theme::button(theme::ACCENT)
        } else if i < state.index {
            theme::fg(theme::GREEN)
        } else {
            theme::muted()
        };
        frame.fill_bg(cell, style);
        let text = Line::styled(label.as_str(), style);
        ui::centered(frame, cell.x, cell.y, cell.width, &text);
        frame.register_hit(cell, hit::TAB, i as u64);
    }
}

/// Footer across `area` (expects [`FOOTER_ROWS`] rows).
pub fn footer(frame: &mut Frame, area: Rect, state: ChromeState) {
    frame.fill_bg(area, theme::page());
    let rule = "─".repeat(usize::from(area.width));
    frame
        .buffer
        .set_string(area.x, area.y, &rule, theme::border());

    let y = area.y + 1;
    let pad = if state.compact { theme::SM } else { theme::LG };
    let left = area.x + pad;
    let right = area.right().saturating_sub(pad);

    // Dots and hint on the right.
    let dots_w = u16::try_from(PHASE_COUNT * 2 - 1).unwrap_or(0);
    let mut x = right.saturating_sub(dots_w);
    for i in 0..PHASE_COUNT {
        let color = if i == state.index {
            theme::ACCENT
        } else if i < state.index {
            theme::GREEN
        } else {
            theme::TEXT_TER
        };
        frame.buffer.set_string(x, y, "●", theme::fg(color));
        frame.register_hit(Rect::new(x, y, 1, 1), hit::DOT, i as u64);
        x += 2;
    }
    let hint_w = u16::try_from(display_width(SWIPE_HINT)).unwrap_or(0);
    let hint_x = right.saturating_sub(dots_w + 2 + hint_w);
    if !state.compact {
        frame.buffer.set_string(hint_x, y, SWIPE_HINT, theme::muted());
    }

    let next = (state.index + 1 < PHASE_COUNT)
        .then(|| format!("Next: {} →", PHASES[state.index + 1].name));
    let mut buttons: Vec<(&str, Style, HitId)> = Vec::new();
    if state.index > 0 {
        buttons.push((RESTART_LABEL, theme::ghost_button(), hit::RESTART));
    }
    if let Some(next) = next.as_deref() {
        buttons.push((next, theme::button(theme::ACCENT), hit::NEXT));
    }
    let total = buttons
        .iter()
        .map(|(label, _, _)| ui::button_width(label) + 1)
        .sum::<u16>()
        .saturating_sub(1);
    let span_right = if state.compact {
        right.saturating_sub(dots_w + 1)
    } else {
        hint_x.saturating_sub(2)
    };

    // The note only shows when the buttons still fit beside it.
    let note_end = left + 4 + u16::try_from(display_width(FOOTER_NOTE)).unwrap_or(0);
    let show_note = !state.compact && note_end + 2 + total <= span_right;
    if show_note {
        let x = logo(frame, left, y) + 1;
        frame.buffer.set_string(x, y, FOOTER_NOTE, theme::muted());
    }
    let centered = area.x + area.width.saturating_sub(total) / 2;
    let mut bx = match (state.compact, show_note) {
        (true, _) => left,
        (false, true) => centered.max(note_end + 2),
        (false, false) => centered.max(left),
    };
    for (label, style, id) in buttons {
        if bx + ui::button_width(label) > span_right {
            break;
        }
        let rect = ui::button(frame, bx, y, label, style, id, 0);
        bx = rect.right() + 1;
    }
}

/// Full-screen loading splash.
pub fn splash(frame: &mut Frame) {
    let area = frame.bounds();
    frame.fill_bg(area, theme::page());
    let mid = area.y + area.height / 2;
    let logo_x = area.x + area.width.saturating_sub(3) / 2;
    logo(frame, logo_x, mid.saturating_sub(1));
    ui::centered(
        frame,
        area.x,
        mid + 1,
        area.width,
        &Line::styled(SPLASH_TEXT, theme::muted()),
    );
}
