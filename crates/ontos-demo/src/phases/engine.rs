#![forbid(unsafe_code)]

//! Phase 2: the `.onto` listing "compiling" in front of the viewer.
//!
//! The listing is revealed two lines every 60 ms through a [`Sequencer`]
//! whose entries are reveal chunks rather than source lines. Top-level
//! blocks fold to their header line on click, or all at once with `f`.

use ontos_core::event::KeyEvent;
use ontos_core::geometry::{Rect, Sides};
use ontos_core::playback::{PlaybackEvent, Sequencer, Wake};
use ontos_render::frame::{Frame, HitData};
use ontos_render::style::Style;
use ontos_render::text::Line;
use ontos_render::widgets::{Block, BorderType, ProgressBar, Widget};
use ontos_runtime::Cmd;
use tracing::{debug, info};

use super::{PhaseView, schedule};
use crate::fixtures::{ENGINE_INTRO, ENGINE_STATS, ONTO_FILE, ONTO_FILENAME};
use crate::onto_syntax::{FoldSection, fold_sections, highlight};
use crate::theme;
use crate::ui::{self, ViewCtx, hit};

/// Lines revealed per step.
const LINES_PER_STEP: usize = 2;
const STEP_MS: u64 = 60;
/// Code rows kept in view while the listing is still growing.
const TAIL_ROWS: usize = 24;
const GUTTER: usize = 4;

#[derive(Debug, Clone, Copy)]
pub enum Msg {
    Wake(Wake),
    /// Fold or unfold the section with this index.
    Toggle(usize),
    /// Unfold everything if anything is folded, otherwise fold everything.
    ToggleAll,
}

#[derive(Debug)]
pub struct EnginePhase {
    lines: Vec<&'static str>,
    sections: Vec<FoldSection>,
    collapsed: Vec<bool>,
    reveal: Sequencer,
}

impl Default for EnginePhase {
    fn default() -> Self {
        Self::new()
    }
}

impl EnginePhase {
    pub fn new() -> Self {
        let lines: Vec<&'static str> = ONTO_FILE.lines().collect();
        let sections = fold_sections(lines.iter().copied());
        let steps: Vec<u64> = (0..lines.len().div_ceil(LINES_PER_STEP) as u64)
            .map(|i| i * STEP_MS)
            .collect();
        Self {
            collapsed: vec![false; sections.len()],
            sections,
            reveal: Sequencer::single(&steps[..]),
            lines,
        }
    }

    /// Source lines revealed so far.
    pub fn visible_lines(&self) -> usize {
        (self.reveal.revealed_count() * LINES_PER_STEP).min(self.lines.len())
    }

    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn is_compiled(&self) -> bool {
        self.visible_lines() >= self.lines.len()
    }

    pub fn sections(&self) -> &[FoldSection] {
        &self.sections
    }

    pub fn is_collapsed(&self, section: usize) -> bool {
        self.collapsed.get(section).copied().unwrap_or(false)
    }

    fn is_hidden(&self, line: usize) -> bool {
        self.sections
            .iter()
            .zip(&self.collapsed)
            .any(|(s, &folded)| folded && s.hides(line))
    }

    fn section_at(&self, line: usize) -> Option<usize> {
        self.sections.iter().position(|s| s.start == line)
    }

    /// Indices of source lines that get a row, in order.
    fn shown_lines(&self) -> Vec<usize> {
        (0..self.visible_lines())
            .filter(|&i| !self.is_hidden(i))
            .collect()
    }

    fn code_row(&self, frame: &mut Frame, area: Rect, index: usize) {
        let number = format!("{:>GUTTER$}", index + 1);
        let mut x = frame
            .buffer
            .set_stringn(area.x, area.y, &number, area.right(), theme::muted());
        x += 2;

        let section = self.section_at(index);
        if let Some(s) = section {
            let marker = if self.collapsed[s] { "▶ " } else { "▼ " };
            x = frame
                .buffer
                .set_stringn(x, area.y, marker, area.right(), theme::muted());
            frame.register_hit(area, hit::PHASE, s as HitData);
        } else {
            x += 2;
        }

        let end = highlight(self.lines[index]).render(
            &mut frame.buffer,
            x,
            area.y,
            area.right(),
            Style::new(),
        );
        if let Some(s) = section
            && self.collapsed[s]
        {
            let folded = format!("  …{} lines", self.sections[s].hidden_len());
            frame
                .buffer
                .set_stringn(end, area.y, &folded, area.right(), theme::muted());
        }
    }

    fn code_panel(&self, frame: &mut Frame, y: u16, width: u16) -> u16 {
        let shown = self.shown_lines();
        let compiled = self.is_compiled();
        let rows = if compiled {
            &shown[..]
        } else {
            &shown[shown.len().saturating_sub(TAIL_ROWS)..]
        };

        let height = 2 + 3 + 1 + rows.len() as u16 + 1;
        let area = Rect::new(0, y, width, height);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme::border())
            .style(theme::panel());
        block.render(area, frame);
        let inner = block.inner(area);

        let total = self.lines.len();
        let visible = self.visible_lines();
        let mut status = Line::styled(format!("{visible}/{total} lines"), theme::muted());
        status.push("   ", Style::new());
        if compiled {
            status.push("✓ Compiled", theme::fg(theme::GREEN));
        } else {
            status.push("● Compiling...", theme::fg(theme::AMBER));
        }
        let (bar, rest) = inner.split_top(1);
        ui::window_bar(frame, bar, ONTO_FILENAME, Some(&status));

        let (progress, rest) = rest.split_top(1);
        let ratio = visible as f64 / total.max(1) as f64;
        let fill = if compiled { theme::GREEN } else { theme::ACCENT };
        ProgressBar::new(ratio)
            .colors(fill, theme::BORDER)
            .thin(true)
            .render(progress, frame);

        let (info_row, rest) = rest.split_top(1);
        let info_row = info_row.inner(Sides::horizontal(theme::SM));
        let (left, right) = if compiled {
            (
                Line::styled("✓ Compilation complete", theme::muted()),
                Line::styled("ontology.compiled → runtime", theme::fg(theme::GREEN)),
            )
        } else {
            (
                Line::styled(
                    format!("Compiling: {}%", (ratio * 100.0).round() as u32),
                    theme::muted(),
                ),
                Line::styled(format!("parsing line {visible}..."), theme::fg(theme::AMBER)),
            )
        };
        left.render(&mut frame.buffer, info_row.x, info_row.y, info_row.right(), Style::new());
        let rx = info_row
            .right()
            .saturating_sub(u16::try_from(right.width()).unwrap_or(u16::MAX));
        right.render(&mut frame.buffer, rx, info_row.y, info_row.right(), Style::new());

        let code = rest.inner(Sides::new(1, theme::SM, 0, theme::XS));
        for (row, &index) in rows.iter().enumerate() {
            let line_area = Rect::new(code.x, code.y + row as u16, code.width, 1);
            self.code_row(frame, line_area, index);
        }
        height
    }
}

impl PhaseView for EnginePhase {
    type Message = Msg;

    fn mount(&mut self) -> Cmd<Msg> {
        schedule(self.reveal.start(), Msg::Wake)
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Wake(wake) => {
                let next = self.reveal.fire(wake);
                for event in self.reveal.drain_events() {
                    if event == PlaybackEvent::Completed {
                        info!(lines = self.lines.len(), "listing compiled");
                    }
                }
                schedule(next, Msg::Wake)
            }
            Msg::Toggle(section) => {
                if let Some(folded) = self.collapsed.get_mut(section) {
                    *folded = !*folded;
                    debug!(section, folded = *folded, "section toggled");
                }
                Cmd::none()
            }
            Msg::ToggleAll => {
                let fold = !self.collapsed.iter().any(|&c| c);
                self.collapsed.fill(fold);
                debug!(fold, "all sections toggled");
                Cmd::none()
            }
        }
    }

    fn key(&self, key: &KeyEvent) -> Option<Msg> {
        key.is_char('f').then_some(Msg::ToggleAll)
    }

    fn click(&self, data: HitData) -> Option<Msg> {
        usize::try_from(data).ok().map(Msg::Toggle)
    }

    fn view(&self, frame: &mut Frame, ctx: ViewCtx) -> u16 {
        let width = frame.width();
        let mut y = ui::phase_header(frame, width, 1, Some(ENGINE_INTRO));
        y += self.code_panel(frame, y, width);
        if self.is_compiled() {
            y += 1;
            y += ui::stat_tiles(frame, y, width, &ENGINE_STATS, ctx.compact);
        }
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use ontos_core::event::KeyCode;
    use ontos_render::export::{buffer_to_text, find_text};

    /// Fire wakes until the chain ends or `limit` wakes have fired.
    fn run(phase: &mut EnginePhase, mut cmd: Cmd<Msg>, limit: usize) -> Cmd<Msg> {
        for _ in 0..limit {
            match cmd {
                Cmd::After(_, msg @ Msg::Wake(_)) => cmd = phase.update(msg),
                other => return other,
            }
        }
        cmd
    }

    fn compiled() -> EnginePhase {
        let mut p = EnginePhase::new();
        let cmd = p.mount();
        run(&mut p, cmd, 1000);
        p
    }

    fn render(p: &EnginePhase) -> Frame {
        let mut frame = Frame::new(110, 300);
        p.view(&mut frame, ViewCtx::default());
        frame
    }

    #[test]
    fn reveals_two_lines_per_step() {
        let mut p = EnginePhase::new();
        assert_eq!(p.visible_lines(), 0);
        let cmd = p.mount();
        let Cmd::After(first, _) = &cmd else {
            panic!("expected a timer");
        };
        assert_eq!(*first, Duration::ZERO);
        let next = run(&mut p, cmd, 3);
        assert_eq!(p.visible_lines(), 6);
        assert!(matches!(next, Cmd::After(d, _) if d == Duration::from_millis(STEP_MS)));
    }

    #[test]
    fn compiles_every_line_then_stops() {
        let p = compiled();
        assert_eq!(p.visible_lines(), 117);
        assert!(p.is_compiled());
    }

    #[test]
    fn compiling_view_shows_progress_and_the_tail() {
        let mut p = EnginePhase::new();
        let cmd = p.mount();
        run(&mut p, cmd, 20);
        let text = buffer_to_text(&render(&p).buffer);
        assert!(text.contains("40/117 lines"));
        assert!(text.contains("● Compiling..."));
        assert!(text.contains("parsing line 40..."));
        assert!(text.contains("Compiling: 34%"));
        assert!(!text.contains("<1ms"), "tiles appear only once compiled");
    }

    #[test]
    fn compiled_view_shows_status_and_tiles() {
        let text = buffer_to_text(&render(&compiled()).buffer);
        assert!(text.contains("117/117 lines"));
        assert!(text.contains("✓ Compiled"));
        assert!(text.contains("ontology.compiled → runtime"));
        assert!(text.contains("rule systemic_carry_unwind"));
        assert!(text.contains("<1ms"));
    }

    #[test]
    fn folding_hides_the_body_and_shows_a_count() {
        let mut p = compiled();
        assert!(buffer_to_text(&render(&p).buffer).contains("version: \"4.2.1\""));
        p.update(Msg::Toggle(0));
        assert!(p.is_collapsed(0));
        let text = buffer_to_text(&render(&p).buffer);
        assert!(!text.contains("version: \"4.2.1\""));
        assert!(text.contains("▶ @metadata {  …6 lines"));
        assert!(text.contains("▼ class Indicator {"));
    }

    #[test]
    fn header_rows_are_clickable() {
        let p = compiled();
        let frame = render(&p);
        let Some((x, y)) = find_text(&frame.buffer, "class Sector") else {
            panic!("header not rendered");
        };
        assert_eq!(frame.hit_test(x, y), Some((hit::PHASE, 2)));
        assert!(matches!(p.click(2), Some(Msg::Toggle(2))));
    }

    #[test]
    fn fold_all_then_unfold_all() {
        let mut p = compiled();
        assert!(matches!(
            p.key(&KeyEvent::new(KeyCode::Char('f'))),
            Some(Msg::ToggleAll)
        ));
        p.update(Msg::ToggleAll);
        assert!((0..p.sections().len()).all(|i| p.is_collapsed(i)));
        p.update(Msg::ToggleAll);
        assert!((0..p.sections().len()).all(|i| !p.is_collapsed(i)));

        // Any folded section makes the next toggle unfold everything.
        p.update(Msg::Toggle(3));
        p.update(Msg::ToggleAll);
        assert!((0..p.sections().len()).all(|i| !p.is_collapsed(i)));
    }

    #[test]
    fn out_of_range_toggle_is_ignored() {
        let mut p = compiled();
        p.update(Msg::Toggle(99));
        assert!((0..p.sections().len()).all(|i| !p.is_collapsed(i)));
    }
}
