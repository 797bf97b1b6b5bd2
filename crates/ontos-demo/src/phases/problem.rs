#![forbid(unsafe_code)]

//! Phase 1: the cross-asset query and why a table-join stack struggles
//! with it.
//!
//! Everything here is frame-driven: three counters ease up from zero, the
//! two step lists slide in on a stagger, and the `vs` badge pulses.

use std::time::Duration;

use ontos_core::animation::{AnimatedCounter, Pulse, staggered_count, with_thousands};
use ontos_core::geometry::Rect;
use ontos_render::frame::Frame;
use ontos_render::cell::PackedRgba;
use ontos_render::text::{Line, wrap_line};
use ontos_render::widgets::paragraph::Alignment;
use ontos_runtime::Cmd;

use super::{BLINK, FRAME, PhaseView};
use crate::fixtures::{
    Fragment, GRAPH_COMPLEXITY, GRAPH_STEPS, PROBLEM_COUNTERS, PROBLEM_OUTRO, QUERY,
    QUERY_HISTORY, QUERY_SCOPE, STACK_COMPLEXITY, STACK_STEPS,
};
use crate::theme;
use crate::ui::{self, ViewCtx};

const STACK_FIRST: Duration = Duration::from_millis(300);
const GRAPH_FIRST: Duration = Duration::from_millis(500);
const STEP_STAGGER: Duration = Duration::from_millis(150);
const VS_PERIOD: Duration = Duration::from_secs(2);
const VS_WIDTH: u16 = 8;

/// Phase 1 has no messages of its own.
#[derive(Debug)]
pub enum Msg {}

#[derive(Debug)]
pub struct ProblemPhase {
    counters: [AnimatedCounter; 3],
    elapsed: Duration,
    vs: Pulse,
}

impl Default for ProblemPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemPhase {
    pub fn new() -> Self {
        Self {
            counters: PROBLEM_COUNTERS
                .map(|c| AnimatedCounter::new(c.target, Duration::from_millis(c.duration_ms))),
            elapsed: Duration::ZERO,
            vs: Pulse::new(VS_PERIOD),
        }
    }

    /// Displayed counter values.
    pub fn counter_values(&self) -> [u64; 3] {
        self.counters.map(|c| c.value())
    }

    /// Visible steps in the (stack, graph) columns.
    pub fn revealed_steps(&self) -> (usize, usize) {
        (
            staggered_count(self.elapsed, STACK_FIRST, STEP_STAGGER, STACK_STEPS.len()),
            staggered_count(self.elapsed, GRAPH_FIRST, STEP_STAGGER, GRAPH_STEPS.len()),
        )
    }

    fn is_animating(&self) -> bool {
        let (stack, graph) = self.revealed_steps();
        self.counters.iter().any(|c| !c.is_complete())
            || stack < STACK_STEPS.len()
            || graph < GRAPH_STEPS.len()
    }

    fn counters_row(&self, frame: &mut Frame, y: u16, width: u16) -> u16 {
        let row = Rect::new(0, y, width, 2);
        for ((cell, spec), counter) in row
            .columns(3, theme::SM)
            .into_iter()
            .zip(PROBLEM_COUNTERS.iter())
            .zip(self.counters.iter())
        {
            let value = with_thousands(counter.value());
            let color = spec.color.color();
            ui::centered(
                frame,
                cell.x,
                cell.y,
                cell.width,
                &Line::styled(value, theme::fg(color).bold()),
            );
            ui::centered(
                frame,
                cell.x,
                cell.y + 1,
                cell.width,
                &Line::styled(spec.label, theme::muted()),
            );
        }
        2
    }

    fn vs_badge(&self, frame: &mut Frame, area: Rect, vertical_rails: bool) {
        let style = if self.vs.is_on() {
            theme::fg(theme::RED).bold()
        } else {
            theme::fg(theme::RED).dim()
        };
        let mid = area.y + area.height / 2;
        ui::centered(frame, area.x, mid, area.width, &Line::styled("( vs )", style));
        if vertical_rails {
            let x = area.x + area.width / 2;
            let rail = theme::fg(theme::tint(theme::RED, 0.4));
            for y in area.y..mid.saturating_sub(1) {
                frame.buffer.set_string(x, y, "│", rail);
            }
            for y in mid + 2..area.bottom() {
                frame.buffer.set_string(x, y, "│", rail);
            }
        }
    }
}

fn query_lines() -> Vec<Line> {
    vec![
        Line::styled("THE QUERY", theme::eyebrow(theme::AMBER)),
        Line::new(),
        ui::fragments(&QUERY, theme::fg(theme::TEXT)),
        Line::new(),
        Line::styled(QUERY_SCOPE, theme::body()),
        Line::styled(QUERY_HISTORY, theme::fg(theme::RED)),
    ]
}

/// Title, the first `shown` steps, and the complexity footer. Steps not
/// shown yet leave as many blank rows as they will wrap to in a card
/// `card_width` wide, so the footer never moves.
fn column_lines(
    title: &'static str,
    color: PackedRgba,
    steps: &[&[Fragment]],
    shown: usize,
    complexity: &[&str; 3],
    card_width: u16,
) -> Vec<Line> {
    let inner = usize::from(card_width.saturating_sub(2 + 2 * theme::SM).max(1));
    let mut lines = vec![Line::styled(title, theme::eyebrow(color)), Line::new()];
    for (i, step) in steps.iter().enumerate() {
        let line = ui::fragments(step, theme::body());
        if i < shown {
            lines.push(line);
        } else {
            let rows = wrap_line(&line, inner).len().max(1);
            lines.extend(std::iter::repeat_with(Line::new).take(rows));
        }
    }
    lines.push(Line::new());
    lines.push(Line::styled(complexity[0], theme::fg(color).bold()));
    lines.push(Line::styled(complexity[1], theme::body()));
    lines.push(Line::styled(complexity[2], theme::body()));
    lines
}

impl PhaseView for ProblemPhase {
    type Message = Msg;

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {}
    }

    fn tick(&mut self, dt: Duration) {
        for counter in &mut self.counters {
            counter.tick(dt);
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        self.vs.tick(dt);
    }

    fn frame_interval(&self) -> Option<Duration> {
        Some(if self.is_animating() { FRAME } else { BLINK })
    }

    fn view(&self, frame: &mut Frame, ctx: ViewCtx) -> u16 {
        let width = frame.width();
        let mut y = ui::phase_header(frame, width, 0, None);

        y += self.counters_row(frame, y, width) + 1;

        let query = query_lines();
        let h = ui::card_height(&query, width);
        ui::card(frame, Rect::new(0, y, width, h), theme::BORDER, query, Alignment::Left);
        y += h + 1;

        let (stack_shown, graph_shown) = self.revealed_steps();
        let stack = |w| {
            column_lines(
                "YOUR CURRENT STACK",
                theme::RED,
                &STACK_STEPS,
                stack_shown,
                &STACK_COMPLEXITY,
                w,
            )
        };
        let graph = |w| {
            column_lines(
                "ONTOS COMPILED GRAPH",
                theme::ACCENT,
                &GRAPH_STEPS,
                graph_shown,
                &GRAPH_COMPLEXITY,
                w,
            )
        };

        if ctx.compact {
            let lines = stack(width);
            let h = ui::card_height(&lines, width);
            ui::card(frame, Rect::new(0, y, width, h), theme::BORDER, lines, Alignment::Left);
            y += h;
            self.vs_badge(frame, Rect::new(0, y, width, 3), false);
            y += 3;
            let lines = graph(width);
            let h = ui::card_height(&lines, width);
            ui::card(frame, Rect::new(0, y, width, h), theme::ACCENT, lines, Alignment::Left);
            y += h;
        } else {
            let col = width.saturating_sub(VS_WIDTH) / 2;
            let right_w = width.saturating_sub(col + VS_WIDTH);
            let (left, right) = (stack(col), graph(right_w));
            let h = ui::card_height(&left, col).max(ui::card_height(&right, right_w));
            ui::card(frame, Rect::new(0, y, col, h), theme::BORDER, left, Alignment::Left);
            self.vs_badge(frame, Rect::new(col, y, VS_WIDTH, h), true);
            ui::card(
                frame,
                Rect::new(col + VS_WIDTH, y, right_w, h),
                theme::ACCENT,
                right,
                Alignment::Left,
            );
            y += h;
        }

        y += 1;
        ui::centered(frame, 0, y, width, &Line::styled(PROBLEM_OUTRO, theme::body()));
        y + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontos_render::export::buffer_to_text;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    fn render(phase: &ProblemPhase, width: u16, compact: bool) -> (String, u16) {
        let mut frame = Frame::new(width, 120);
        let used = phase.view(&mut frame, ViewCtx { compact });
        (buffer_to_text(&frame.buffer), used)
    }

    #[test]
    fn counters_start_at_zero_and_settle_on_targets() {
        let mut p = ProblemPhase::new();
        assert_eq!(p.counter_values(), [0, 0, 0]);
        p.tick(MS(1000));
        let mid = p.counter_values();
        assert!(mid[0] > 0 && mid[0] < 3100);
        p.tick(MS(1500));
        assert_eq!(p.counter_values(), [3100, 28_400, 847]);
    }

    #[test]
    fn steps_stagger_in() {
        let mut p = ProblemPhase::new();
        p.tick(MS(299));
        assert_eq!(p.revealed_steps(), (0, 0));
        p.tick(MS(1));
        assert_eq!(p.revealed_steps(), (1, 0));
        p.tick(MS(200));
        assert_eq!(p.revealed_steps(), (2, 1));
        p.tick(MS(2000));
        assert_eq!(p.revealed_steps(), (7, 7));
    }

    #[test]
    fn frame_rate_drops_once_settled() {
        let mut p = ProblemPhase::new();
        assert_eq!(p.frame_interval(), Some(FRAME));
        p.tick(MS(2500));
        assert_eq!(p.frame_interval(), Some(BLINK));
    }

    #[test]
    fn hidden_steps_are_not_drawn() {
        let p = ProblemPhase::new();
        let (text, _) = render(&p, 110, false);
        assert!(text.contains("YOUR CURRENT STACK"));
        assert!(!text.contains("1. Join sentiment tables"));
    }

    #[test]
    fn settled_view_shows_every_section() {
        let mut p = ProblemPhase::new();
        p.tick(MS(3000));
        let (text, used) = render(&p, 110, false);
        for needle in [
            "PHASE 1",
            "The Mathematical Nightmare",
            "28,400",
            "THE QUERY",
            "cross-asset table joins",
            "3,100 indicators are nodes",
            "O(V + E)",
            "vs",
            "Let's see the rule.",
        ] {
            assert!(text.contains(needle), "missing {needle}");
        }
        assert!(used > 20);
    }

    #[test]
    fn card_height_does_not_change_as_steps_appear() {
        let early = ProblemPhase::new();
        let mut late = ProblemPhase::new();
        late.tick(MS(3000));
        assert_eq!(render(&early, 110, false).1, render(&late, 110, false).1);
    }

    #[test]
    fn compact_layout_stacks_the_columns() {
        let mut p = ProblemPhase::new();
        p.tick(MS(3000));
        let mut frame = Frame::new(60, 160);
        p.view(&mut frame, ViewCtx { compact: true });
        let stack = ontos_render::export::find_text(&frame.buffer, "YOUR CURRENT STACK");
        let graph = ontos_render::export::find_text(&frame.buffer, "ONTOS COMPILED GRAPH");
        let (Some((_, sy)), Some((_, gy))) = (stack, graph) else {
            panic!("both columns should render");
        };
        assert!(gy > sy);
    }
}
