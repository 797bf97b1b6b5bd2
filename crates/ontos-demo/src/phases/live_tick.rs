#![forbid(unsafe_code)]

//! Phase 3: two market ticks pushed through the runtime.
//!
//! Both transcripts live in one two-segment [`Sequencer`]; the viewer's
//! push gesture starts each segment. The visible stage is derived from the
//! sequencer status, never stored next to it:
//!
//! ```text
//! Idle ──push──▶ Running(0) ──▶ PausedBetween ──push──▶ Running(1) ──▶ Complete
//!  ready           tick1           between                tick2           done
//! ```
//!
//! Replay rewinds the sequencer from any stage; timers still in flight from
//! the abandoned run carry the old epoch and are ignored.

use std::time::Duration;

use ontos_core::animation::{Pulse, staggered_count, with_thousands};
use ontos_core::event::{KeyCode, KeyEvent};
use ontos_core::geometry::{Rect, Sides};
use ontos_core::playback::{PlaybackEvent, PlaybackStatus, Sequencer, Wake};
use ontos_render::display_width;
use ontos_render::frame::{Frame, HitData};
use ontos_render::style::Style;
use ontos_render::text::Line;
use ontos_render::widgets::paragraph::Alignment;
use ontos_render::widgets::{Block, BorderType, Paragraph, Sparkline, Widget};
use ontos_runtime::Cmd;
use tracing::{debug, info};

use super::{BLINK, CANVAS_ROWS, PhaseView, schedule};
use crate::fixtures::{
    BETWEEN_NOTE, BETWEEN_PROMPT, CHART_LEGEND, CHART_TITLE, LIVE_TICK_CLOSING, LIVE_TICK_INTRO,
    LIVE_TICK_PUNCHLINE, REPLAY_BUTTON, RESULT_STATS, SP500, TERMINAL_TITLE, TICK1, TICK1_BUTTON,
    TICK1_INDEX, TICK1_PROMPT, TICK1_PROMPT_NOTE, TICK2, TICK2_BUTTON, TICK2_INDEX, TRAVERSAL,
    TRAVERSAL_TITLE, TimedLine,
};
use crate::theme;
use crate::ui::{self, ViewCtx};

/// Click data for the push buttons.
pub const PUSH: HitData = 0;
/// Click data for the replay button.
pub const REPLAY: HitData = 1;

/// Transcript rows visible while a tick is streaming.
const TAIL_ROWS: u16 = 20;
const CHART_ROWS: u16 = 6;
const CURSOR_PERIOD: Duration = Duration::from_millis(1600);
const NODE_STAGGER: Duration = Duration::from_millis(400);

/// Where the walkthrough stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ready,
    Tick1,
    Between,
    Tick2,
    Done,
}

#[derive(Debug, Clone, Copy)]
pub enum Msg {
    /// Start the next tick, if one is waiting.
    Push,
    Wake(Wake),
    Replay,
}

#[derive(Debug)]
pub struct LiveTickPhase {
    ticks: Sequencer,
    cursor: Pulse,
    since_done: Duration,
}

impl Default for LiveTickPhase {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveTickPhase {
    pub fn new() -> Self {
        Self {
            ticks: Sequencer::segmented(&[&TICK1[..], &TICK2[..]]),
            cursor: Pulse::new(CURSOR_PERIOD),
            since_done: Duration::ZERO,
        }
    }

    pub fn stage(&self) -> Stage {
        match self.ticks.status() {
            PlaybackStatus::Idle => Stage::Ready,
            PlaybackStatus::Running if self.ticks.current_segment() == 0 => Stage::Tick1,
            PlaybackStatus::Running => Stage::Tick2,
            PlaybackStatus::PausedBetween => Stage::Between,
            PlaybackStatus::Complete => Stage::Done,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.ticks.status()
    }

    /// Lines shown from (tick 1, tick 2).
    pub fn revealed(&self) -> (usize, usize) {
        (self.ticks.revealed_in(0), self.ticks.revealed_in(1))
    }

    /// Traversal nodes shown so far.
    pub fn traversal_nodes(&self) -> usize {
        if self.stage() != Stage::Done {
            return 0;
        }
        staggered_count(self.since_done, Duration::ZERO, NODE_STAGGER, TRAVERSAL.len())
    }

    fn is_running(&self) -> bool {
        matches!(self.stage(), Stage::Tick1 | Stage::Tick2)
    }

    fn transcript(&self) -> Vec<Line> {
        let (first, second) = self.revealed();
        let line = |l: &TimedLine| Line::styled(l.text, theme::fg(l.color.color()));
        let mut lines: Vec<Line> = TICK1[..first].iter().map(line).collect();
        if matches!(self.stage(), Stage::Between | Stage::Tick2 | Stage::Done) {
            lines.push(Line::new());
        }
        lines.extend(TICK2[..second].iter().map(line));
        if self.is_running() {
            let style = if self.cursor.is_on() {
                theme::fg(theme::GREEN)
            } else {
                theme::fg(theme::TERMINAL_BG)
            };
            lines.push(Line::styled("▋", style));
        }
        lines
    }

    fn badge(&self) -> Line {
        match self.stage() {
            Stage::Ready => Line::styled("○ ready", theme::muted()),
            Stage::Tick1 | Stage::Tick2 => Line::styled("● processing...", theme::fg(theme::AMBER)),
            Stage::Between => Line::styled("○ tick 1 clean — waiting", theme::fg(theme::AMBER)),
            Stage::Done => Line::styled("🔥 ALERT — 0.42ms", theme::fg(theme::GREEN)),
        }
    }

    fn chart(&self, frame: &mut Frame, y: u16, width: u16) -> u16 {
        let height = 2 + 1 + CHART_ROWS + 2;
        let area = Rect::new(0, y, width, height);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme::border())
            .style(theme::panel())
            .padding(Sides::horizontal(theme::SM));
        block.render(area, frame);
        let inner = block.inner(area);

        ui::centered(frame, inner.x, inner.y, inner.width, &Line::styled(CHART_TITLE, theme::muted()));

        let closes: Vec<f64> = SP500.iter().map(|p| f64::from(p.close)).collect();
        let min = SP500.iter().map(|p| p.close).min().unwrap_or_default();
        let max = SP500.iter().map(|p| p.close).max().unwrap_or_default();
        let (min_label, max_label) = (with_thousands(u64::from(min)), with_thousands(u64::from(max)));
        let axis = u16::try_from(display_width(&max_label).max(display_width(&min_label)) + 1)
            .unwrap_or(u16::MAX);

        let plot_top = inner.y + 1;
        frame.buffer.set_string(inner.x, plot_top, &max_label, theme::muted());
        frame
            .buffer
            .set_string(inner.x, plot_top + CHART_ROWS - 1, &min_label, theme::muted());

        let last = SP500.len() - 1;
        let plot = Rect::new(inner.x + axis, plot_top, inner.width.saturating_sub(axis), CHART_ROWS);
        let spark = Sparkline::new(&closes)
            .style(theme::fg(theme::ACCENT))
            .marker(TICK1_INDEX, theme::GREEN)
            .marker(TICK2_INDEX, theme::RED)
            .marker(last, theme::RED);
        spark.render(plot, frame);

        let dates_y = plot_top + CHART_ROWS;
        for (index, color) in [(TICK1_INDEX, theme::GREEN), (TICK2_INDEX, theme::RED), (last, theme::RED)] {
            let label = SP500[index].date;
            let col = plot.x + spark.column_of(index, plot.width);
            let label_width = u16::try_from(display_width(label)).unwrap_or(u16::MAX);
            let x = col
                .saturating_sub(label_width / 2)
                .min(inner.right().saturating_sub(label_width))
                .max(plot.x);
            frame
                .buffer
                .set_stringn(x, dates_y, label, inner.right(), theme::fg(color));
        }

        let mut legend = Line::new();
        for (i, (label, color)) in CHART_LEGEND.iter().enumerate() {
            if i > 0 {
                legend.push("    ", Style::new());
            }
            legend.push(*label, theme::fg(color.color()));
        }
        ui::centered(frame, inner.x, dates_y + 1, inner.width, &legend);
        height
    }

    fn ready_lines() -> Vec<Line> {
        vec![
            Line::styled(TICK1_PROMPT, theme::body()),
            Line::styled(TICK1_PROMPT_NOTE, theme::muted()),
        ]
    }

    fn between_lines() -> Vec<Line> {
        vec![
            Line::styled(BETWEEN_NOTE, theme::body()),
            Line::new(),
            Line::styled(BETWEEN_PROMPT, theme::fg(theme::AMBER)),
        ]
    }

    fn terminal(&self, frame: &mut Frame, y: u16, width: u16) -> u16 {
        let body_w = width.saturating_sub(2 + 2 * theme::SM);
        let centered = |lines| Paragraph::new(lines).wrap(true).alignment(Alignment::Center);

        let mut scratch = Frame::new(body_w, CANVAS_ROWS);
        scratch.fill_bg(scratch.bounds(), Style::new().bg(theme::TERMINAL_BG));
        let transcript = Paragraph::new(self.transcript()).wrap(true);
        let used = transcript.height(body_w).min(CANVAS_ROWS);
        transcript.render(scratch.bounds(), &mut scratch);

        let stage = self.stage();
        let body_h = match stage {
            Stage::Ready => 3 + centered(Self::ready_lines()).height(body_w) + 2 + 3,
            Stage::Tick1 | Stage::Tick2 => TAIL_ROWS,
            Stage::Between => used + 2 + centered(Self::between_lines()).height(body_w) + 2,
            Stage::Done => used,
        };

        let height = 2 + 1 + 1 + body_h + 1;
        let area = Rect::new(0, y, width, height);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme::border())
            .style(Style::new().fg(theme::TEXT).bg(theme::TERMINAL_BG));
        block.render(area, frame);
        let inner = block.inner(area);
        let (bar, _) = inner.split_top(1);
        ui::window_bar(frame, bar, TERMINAL_TITLE, Some(&self.badge()));

        let body = Rect::new(inner.x + theme::SM, inner.y + 2, body_w, body_h);
        match stage {
            Stage::Ready => {
                let prompt = centered(Self::ready_lines());
                let h = prompt.height(body_w);
                prompt.render(Rect::new(body.x, body.y + 3, body_w, h), frame);
                ui::centered_button(
                    frame,
                    body.x,
                    body.y + 3 + h + 1,
                    body_w,
                    TICK1_BUTTON,
                    theme::button(theme::ACCENT),
                    PUSH,
                );
            }
            Stage::Tick1 | Stage::Tick2 => ui::blit_tail(frame, &scratch, used, body),
            Stage::Between => {
                frame.blit_rows(&scratch, 0, Rect::new(body.x, body.y, body_w, used));
                let notes = centered(Self::between_lines());
                let h = notes.height(body_w);
                let top = body.y + used + 1;
                notes.render(Rect::new(body.x, top, body_w, h), frame);
                ui::centered_button(
                    frame,
                    body.x,
                    top + h + 1,
                    body_w,
                    TICK2_BUTTON,
                    theme::button(theme::RED),
                    PUSH,
                );
            }
            Stage::Done => frame.blit_rows(&scratch, 0, body),
        }
        height
    }

    fn traversal_lines(&self) -> Vec<Line> {
        let shown = self.traversal_nodes();
        let mut strip = Line::new();
        for (i, (label, color)) in TRAVERSAL.iter().enumerate() {
            let node = format!("( {label} )");
            if i > 0 {
                let arrow = if i < shown { " ──▶ " } else { "     " };
                strip.push(arrow, theme::fg(theme::ACCENT));
            }
            if i < shown {
                strip.push(node, theme::fg(color.color()).bold());
            } else {
                strip.push(" ".repeat(display_width(&node)), Style::new());
            }
        }
        vec![
            Line::styled(TRAVERSAL_TITLE, theme::fg(theme::ACCENT)),
            Line::new(),
            strip,
        ]
    }

    fn results(&self, frame: &mut Frame, mut y: u16, width: u16, compact: bool) -> u16 {
        let top = y;
        y += ui::stat_tiles(frame, y, width, &RESULT_STATS, compact) + 1;

        let strip = self.traversal_lines();
        let h = ui::card_height(&strip, width);
        ui::card(frame, Rect::new(0, y, width, h), theme::BORDER, strip, Alignment::Center);
        y += h + 1;

        let bw = ui::button_width(REPLAY_BUTTON);
        ui::button(
            frame,
            width.saturating_sub(bw) / 2,
            y,
            REPLAY_BUTTON,
            theme::ghost_button(),
            ui::hit::PHASE,
            REPLAY,
        );
        y += 2;

        let closing = vec![
            ui::fragments(&LIVE_TICK_CLOSING, theme::fg(theme::TEXT)),
            Line::new(),
            Line::styled(LIVE_TICK_PUNCHLINE, theme::fg(theme::ACCENT).bold()),
        ];
        let h = ui::card_height(&closing, width);
        ui::card(
            frame,
            Rect::new(0, y, width, h),
            theme::tint(theme::RED, 0.3),
            closing,
            Alignment::Center,
        );
        y + h - top
    }
}

impl PhaseView for LiveTickPhase {
    type Message = Msg;

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Push => {
                if !matches!(self.stage(), Stage::Ready | Stage::Between) {
                    return Cmd::none();
                }
                self.cursor.reset();
                let wake = self.ticks.start();
                debug!(segment = self.ticks.current_segment(), "tick pushed");
                schedule(wake, Msg::Wake)
            }
            Msg::Wake(wake) => {
                let next = self.ticks.fire(wake);
                for event in self.ticks.drain_events() {
                    match event {
                        PlaybackEvent::SegmentFinished(_) => info!("tick 1 evaluated, no alert"),
                        PlaybackEvent::Completed => {
                            info!(rule = "systemic_carry_unwind", "tick 2 evaluated, rule fired");
                        }
                        PlaybackEvent::Advanced(_) => {}
                    }
                }
                schedule(next, Msg::Wake)
            }
            Msg::Replay => {
                self.ticks.replay();
                self.since_done = Duration::ZERO;
                self.cursor.reset();
                debug!("tick sequence replayed");
                Cmd::none()
            }
        }
    }

    fn key(&self, key: &KeyEvent) -> Option<Msg> {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Msg::Push),
            KeyCode::Char('r') => Some(Msg::Replay),
            _ => None,
        }
    }

    fn click(&self, data: HitData) -> Option<Msg> {
        match data {
            PUSH => Some(Msg::Push),
            REPLAY => Some(Msg::Replay),
            _ => None,
        }
    }

    fn tick(&mut self, dt: Duration) {
        self.cursor.tick(dt);
        if self.stage() == Stage::Done {
            self.since_done = self.since_done.saturating_add(dt);
        }
    }

    fn frame_interval(&self) -> Option<Duration> {
        let revealing = self.stage() == Stage::Done && self.traversal_nodes() < TRAVERSAL.len();
        (self.is_running() || revealing).then_some(BLINK)
    }

    fn view(&self, frame: &mut Frame, ctx: ViewCtx) -> u16 {
        let width = frame.width();
        let mut y = ui::phase_header(frame, width, 2, Some(LIVE_TICK_INTRO));
        y += self.chart(frame, y, width) + 1;
        y += self.terminal(frame, y, width);
        if self.stage() == Stage::Done {
            y += 1;
            y += self.results(frame, y, width, ctx.compact);
        }
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontos_render::export::{buffer_to_text, find_text};

    fn run(phase: &mut LiveTickPhase, mut cmd: Cmd<Msg>) {
        while let Cmd::After(_, msg) = cmd {
            cmd = phase.update(msg);
        }
    }

    fn push_and_finish(phase: &mut LiveTickPhase) {
        let cmd = phase.update(Msg::Push);
        run(phase, cmd);
    }

    fn text(phase: &LiveTickPhase) -> String {
        let mut frame = Frame::new(110, CANVAS_ROWS);
        phase.view(&mut frame, ViewCtx::default());
        buffer_to_text(&frame.buffer)
    }

    #[test]
    fn ready_view_offers_the_first_tick() {
        let p = LiveTickPhase::new();
        assert_eq!(p.stage(), Stage::Ready);
        let t = text(&p);
        assert!(t.contains("○ ready"));
        assert!(t.contains(TICK1_BUTTON));
        assert!(t.contains("S&P 500 — JUL–AUG 2024"));
        assert!(t.contains("5,667"));
        assert!(t.contains("5,186"));
        assert!(t.contains("Jul 16"));
        assert!(t.contains("Aug 5"));
    }

    #[test]
    fn date_labels_fit_at_every_width() {
        let p = LiveTickPhase::new();
        for width in [70, 90, 110, 140, 200] {
            let mut frame = Frame::new(width, CANVAS_ROWS);
            p.view(&mut frame, ViewCtx::default());
            let t = buffer_to_text(&frame.buffer);
            assert!(t.contains("Jul 16"), "width {width}");
            assert!(t.contains("Aug 5"), "width {width}");
        }
    }

    #[test]
    fn push_button_is_clickable() {
        let p = LiveTickPhase::new();
        let mut frame = Frame::new(110, CANVAS_ROWS);
        p.view(&mut frame, ViewCtx::default());
        let Some((x, y)) = find_text(&frame.buffer, TICK1_BUTTON) else {
            panic!("button missing");
        };
        assert_eq!(frame.hit_test(x, y), Some((ui::hit::PHASE, PUSH)));
        assert!(matches!(p.click(PUSH), Some(Msg::Push)));
        assert!(matches!(p.key(&KeyEvent::new(KeyCode::Enter)), Some(Msg::Push)));
    }

    #[test]
    fn first_tick_stays_quiet_and_pauses() {
        let mut p = LiveTickPhase::new();
        push_and_finish(&mut p);
        assert_eq!(p.revealed(), (16, 0));
        assert_eq!(p.status(), PlaybackStatus::PausedBetween);
        assert_eq!(p.stage(), Stage::Between);
        let t = text(&p);
        assert!(t.contains("[ontos-rt] Tick processed in 0.31ms. No alerts."));
        assert!(t.contains("○ tick 1 clean — waiting"));
        assert!(t.contains(TICK2_BUTTON));
        assert!(!t.contains("RULE FIRED"));
    }

    #[test]
    fn second_tick_fires_the_rule() {
        let mut p = LiveTickPhase::new();
        push_and_finish(&mut p);
        push_and_finish(&mut p);
        assert_eq!(p.revealed(), (16, 52));
        assert_eq!(p.status(), PlaybackStatus::Complete);
        let t = text(&p);
        assert!(t.contains("🔥 RULE FIRED: systemic_carry_unwind"));
        assert!(t.contains("🔥 ALERT — 0.42ms"));
        assert!(t.contains("Before VIX hit 65"));
        assert!(t.contains(REPLAY_BUTTON));
        assert!(t.contains("monetized"));
    }

    #[test]
    fn push_while_streaming_is_ignored() {
        let mut p = LiveTickPhase::new();
        let first = p.update(Msg::Push);
        assert!(!first.is_none());
        assert!(p.update(Msg::Push).is_none());
        assert_eq!(p.stage(), Stage::Tick1);
    }

    #[test]
    fn streaming_view_follows_the_newest_line() {
        let mut p = LiveTickPhase::new();
        push_and_finish(&mut p);
        let mut cmd = p.update(Msg::Push);
        for _ in 0..40 {
            if let Cmd::After(_, msg) = cmd {
                cmd = p.update(msg);
            }
        }
        assert_eq!(p.stage(), Stage::Tick2);
        let t = text(&p);
        assert!(t.contains("● processing..."));
        assert!(t.contains("▋"));
        assert!(t.contains(TICK2[39].text));
        assert!(!t.contains("--tick 2024-07-16T15:59:00Z"));
    }

    #[test]
    fn traversal_nodes_appear_after_the_alert() {
        let mut p = LiveTickPhase::new();
        push_and_finish(&mut p);
        push_and_finish(&mut p);
        assert_eq!(p.traversal_nodes(), 1);
        assert_eq!(p.frame_interval(), Some(BLINK));
        p.tick(Duration::from_millis(1200));
        assert_eq!(p.traversal_nodes(), 4);
        assert_eq!(p.frame_interval(), None);
        let t = text(&p);
        assert!(t.contains("( Smart Money ) ──▶ ( JPY Vol )"));
        assert!(t.contains("( VIX Term )"));
    }

    #[test]
    fn replay_rewinds_and_discards_pending_wakes() {
        let mut p = LiveTickPhase::new();
        let cmd = p.update(Msg::Push);
        let Cmd::After(_, Msg::Wake(first)) = cmd else {
            panic!("expected a wake");
        };
        let pending = p.update(Msg::Wake(first));
        assert_eq!(p.revealed(), (1, 0));

        assert!(matches!(p.key(&KeyEvent::new(KeyCode::Char('r'))), Some(Msg::Replay)));
        p.update(Msg::Replay);
        assert_eq!(p.stage(), Stage::Ready);
        assert_eq!(p.revealed(), (0, 0));

        let Cmd::After(_, stale) = pending else {
            panic!("expected the next wake");
        };
        assert!(p.update(stale).is_none());
        assert_eq!(p.revealed(), (0, 0));
        assert!(text(&p).contains(TICK1_BUTTON));
    }
}
