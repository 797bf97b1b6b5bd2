#![forbid(unsafe_code)]

//! Phase 4: a hedged RAG answer next to the agent that reads the compiled
//! graph.
//!
//! The conversation advances in steps:
//!
//! | step | shown                                        |
//! |------|----------------------------------------------|
//! | 0    | ask button                                   |
//! | 1    | question, then thinking dots, then typing    |
//! | 2    | first answer, follow-up button               |
//! | 3    | follow-up question, thinking, typing         |
//! | 4    | second answer                                |
//!
//! Each answer is typed by its own [`Typewriter`]. Typewriters all start at
//! epoch zero, so every typing wake also carries the turn it belongs to.

use std::time::Duration;

use ontos_core::animation::Pulse;
use ontos_core::event::{KeyCode, KeyEvent};
use ontos_core::geometry::Rect;
use ontos_core::playback::{Jitter, Typewriter, Wake};
use ontos_render::display_width;
use ontos_render::frame::{Frame, HitData};
use ontos_render::style::Style;
use ontos_render::text::{Line, wrap_line};
use ontos_render::widgets::Paragraph;
use ontos_render::widgets::Widget;
use ontos_render::widgets::paragraph::Alignment;
use ontos_runtime::{ClipboardError, Cmd};
use tracing::{debug, info};

use super::{BLINK, CANVAS_ROWS, PhaseView, schedule};
use crate::fixtures::{
    CHAT, CHAT_INTRO, CTA, CTA_BUTTON, CTA_LEAD, CTA_URL, RAG_ANSWER, RAG_PROMPT, RAG_WEAKNESSES,
};
use crate::markdown;
use crate::theme;
use crate::ui::{self, ViewCtx};

pub const ASK: HitData = 0;
pub const FOLLOW_UP: HitData = 1;
pub const COPY_FIRST: HitData = 2;
pub const COPY_SECOND: HitData = 3;
pub const COPY_LINK: HitData = 4;

const ASK_LABEL: &str = "Ask: \"Why did we hedge?\"";
const FOLLOW_UP_LABEL: &str = "Ask: \"What's the optimal hedge ratio?\" →";
const COPY_LABEL: &str = "⎘ Copy";
const COPIED_LABEL: &str = "✓ Copied";

const COPIED_FOR: Duration = Duration::from_secs(2);
const CURSOR_PERIOD: Duration = Duration::from_secs(1);
const DOT_PERIOD_MS: u128 = 1000;
const DOT_STAGGER_MS: u128 = 200;
/// Chat rows visible while an answer is on its way.
const TAIL_ROWS: u16 = 22;
/// Rows reserved around the ask button before the chat starts.
const EMPTY_PAD: u16 = 6;

/// What a copy action writes to the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    /// The agent answer at this chat turn.
    Answer(usize),
    /// The scheduling link.
    Link,
}

impl CopyTarget {
    fn text(self) -> &'static str {
        match self {
            Self::Answer(turn) => CHAT.get(turn).map_or("", |t| t.text),
            Self::Link => CTA_URL,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Msg {
    /// Ask the opening question.
    Ask,
    /// Ask the follow-up question.
    FollowUp,
    /// Thinking is over; start typing the answer at `turn`.
    Reveal(usize),
    Type { turn: usize, wake: Wake },
    Copy(CopyTarget),
    Copied {
        target: CopyTarget,
        result: Result<(), ClipboardError>,
    },
    /// Clears the copy confirmation issued under this token.
    CopyExpired(u64),
}

#[derive(Debug)]
struct Typing {
    turn: usize,
    writer: Typewriter,
}

#[derive(Debug)]
pub struct ChatPhase {
    step: usize,
    typing: Option<Typing>,
    jitter: Jitter,
    copied: Option<(CopyTarget, u64)>,
    copy_token: u64,
    cursor: Pulse,
    dots: Duration,
}

impl ChatPhase {
    pub fn new(jitter: Jitter) -> Self {
        Self {
            step: 0,
            typing: None,
            jitter,
            copied: None,
            copy_token: 0,
            cursor: Pulse::new(CURSOR_PERIOD),
            dots: Duration::ZERO,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Text typed so far for the answer in progress.
    pub fn typing_text(&self) -> Option<&str> {
        self.typing.as_ref().map(|t| t.writer.revealed())
    }

    /// Waiting for an answer to start typing.
    pub fn is_thinking(&self) -> bool {
        self.step % 2 == 1 && self.typing.is_none()
    }

    /// Completed turns, question and answer text as delivered.
    pub fn transcript(&self) -> Vec<&'static str> {
        CHAT.iter()
            .enumerate()
            .filter(|(turn, _)| self.is_done(*turn))
            .map(|(_, t)| t.text)
            .collect()
    }

    pub fn copied(&self) -> Option<CopyTarget> {
        self.copied.map(|(target, _)| target)
    }

    /// Whether turn `turn` is fully on screen.
    fn is_done(&self, turn: usize) -> bool {
        turn < CHAT.len() && self.step > turn
    }

    fn last_answer(&self) -> Option<usize> {
        match self.step {
            4.. => Some(3),
            2 | 3 => Some(1),
            _ => None,
        }
    }

    fn question(&mut self, step: usize) -> Cmd<Msg> {
        if self.step + 1 != step {
            return Cmd::none();
        }
        self.step = step;
        self.dots = Duration::ZERO;
        let answer = step;
        let delay = CHAT.get(answer).map_or(0, |t| t.reveal_delay_ms);
        debug!(turn = step - 1, "question asked");
        Cmd::after(Duration::from_millis(delay), Msg::Reveal(answer))
    }

    fn is_copied(&self, target: CopyTarget) -> bool {
        self.copied() == Some(target)
    }

    /// Right-aligned user bubble. Returns rows used.
    fn user_bubble(frame: &mut Frame, y: u16, width: u16, text: &str) -> u16 {
        let max = (width * 4 / 5).max(8);
        let rows = wrap_line(&Line::raw(text), usize::from(max.saturating_sub(4)));
        let text_w = rows.iter().map(Line::width).max().unwrap_or(0);
        let bubble_w = u16::try_from(text_w + 4).unwrap_or(max).min(max);
        let x = width.saturating_sub(bubble_w);
        let height = u16::try_from(rows.len()).unwrap_or(1) + 2;
        frame.fill_bg(
            Rect::new(x, y, bubble_w, height),
            Style::new().bg(theme::ELEVATED),
        );
        for (i, row) in rows.iter().enumerate() {
            let ry = y + 1 + u16::try_from(i).unwrap_or(0);
            row.render(&mut frame.buffer, x + 2, ry, x + bubble_w, theme::fg(theme::TEXT));
        }
        height
    }

    /// Agent bubble with a rail down its left edge. Returns rows used.
    fn agent_bubble(frame: &mut Frame, y: u16, width: u16, rows: Vec<Line>) -> u16 {
        let height = u16::try_from(rows.len()).unwrap_or(0);
        let rail = theme::fg(theme::tint(theme::ACCENT, 0.5));
        for i in 0..height {
            frame.buffer.set_string(0, y + i, "│", rail);
        }
        Paragraph::new(rows).render(Rect::new(2, y, width.saturating_sub(2), height), frame);
        height
    }

    fn typing_rows(&self, text: &str, width: u16) -> Vec<Line> {
        let base = theme::fg(theme::TEXT_SEC);
        let mut lines: Vec<Line> = text.split('\n').map(|l| Line::styled(l, base)).collect();
        let cursor = if self.cursor.is_on() {
            theme::fg(theme::ACCENT)
        } else {
            Style::new().dim()
        };
        if let Some(last) = lines.last_mut() {
            last.push("▋", cursor);
        }
        lines
            .iter()
            .flat_map(|l| wrap_line(l, usize::from(width.max(1))))
            .collect()
    }

    fn thinking_dots(&self) -> Line {
        let elapsed = self.dots.as_millis();
        let mut line = Line::new();
        for i in 0..3u128 {
            let phase = (elapsed + DOT_PERIOD_MS - i * DOT_STAGGER_MS) % DOT_PERIOD_MS;
            let style = if phase < DOT_PERIOD_MS / 2 {
                theme::fg(theme::ACCENT)
            } else {
                theme::fg(theme::tint(theme::ACCENT, 0.3))
            };
            if i > 0 {
                line.push(" ", Style::new());
            }
            line.push("●", style);
        }
        line
    }

    /// The conversation, top to bottom. Returns rows used.
    fn chat_body(&self, frame: &mut Frame, width: u16) -> u16 {
        if self.step == 0 {
            ui::centered_button(
                frame,
                0,
                EMPTY_PAD,
                width,
                ASK_LABEL,
                theme::button(theme::ACCENT),
                ASK,
            );
            return EMPTY_PAD * 2 + 1;
        }

        let mut y = 0;
        for (turn, chat) in CHAT.iter().enumerate() {
            let answer_turn = turn % 2 == 1;
            if !answer_turn {
                if self.step < turn + 1 {
                    break;
                }
                y += Self::user_bubble(frame, y, width, chat.text) + 1;
                continue;
            }
            if self.step > turn {
                let rows = markdown::layout(&markdown::parse(chat.text), width.saturating_sub(2));
                y += Self::agent_bubble(frame, y, width, rows);
                let (label, style) = if self.is_copied(CopyTarget::Answer(turn)) {
                    (COPIED_LABEL, theme::fg(theme::GREEN))
                } else {
                    (COPY_LABEL, theme::muted())
                };
                let x = width.saturating_sub(ui::button_width(label));
                let data = if turn == 1 { COPY_FIRST } else { COPY_SECOND };
                ui::button(frame, x, y, label, style, ui::hit::PHASE, data);
                y += 2;
            } else if let Some(typing) = self.typing.as_ref().filter(|t| t.turn == turn) {
                let rows = self.typing_rows(typing.writer.revealed(), width.saturating_sub(2));
                y += Self::agent_bubble(frame, y, width, rows) + 1;
            } else if self.is_thinking() {
                self.thinking_dots()
                    .render(&mut frame.buffer, 2, y, width, Style::new());
                y += 2;
            }
        }

        if self.step == 2 {
            let x = width.saturating_sub(ui::button_width(FOLLOW_UP_LABEL));
            ui::button(
                frame,
                x,
                y,
                FOLLOW_UP_LABEL,
                Style::new().fg(theme::ACCENT).bg(theme::ELEVATED),
                ui::hit::PHASE,
                FOLLOW_UP,
            );
            y += 2;
        }
        y
    }

    fn chat_panel(&self, frame: &mut Frame, area_x: u16, y: u16, width: u16, min_height: u16) -> u16 {
        let inner_w = width.saturating_sub(2 + 2 * theme::SM);
        let mut scratch = Frame::new(inner_w, CANVAS_ROWS);
        scratch.fill_bg(scratch.bounds(), theme::panel());
        let used = self.chat_body(&mut scratch, inner_w).min(CANVAS_ROWS);
        let waiting = self.step % 2 == 1;
        let body_h = if waiting { TAIL_ROWS } else { used };
        let height = (body_h + 4).max(min_height);

        let inner = ui::panel(
            frame,
            Rect::new(area_x, y, width, height),
            theme::tint(theme::ACCENT, 0.4),
        );
        frame.buffer.set_string(
            inner.x,
            inner.y,
            "ONTOS AGENT",
            theme::eyebrow(theme::ACCENT),
        );
        let tag = "Powered by compiled .onto graph";
        let tag_w = u16::try_from(display_width(tag)).unwrap_or(0);
        if inner.width > tag_w + 13 {
            frame
                .buffer
                .set_string(inner.right() - tag_w, inner.y, tag, theme::muted());
        }
        let rule = "─".repeat(usize::from(inner.width));
        frame
            .buffer
            .set_string(inner.x, inner.y + 1, &rule, theme::border());

        let body = Rect::new(inner.x, inner.y + 2, inner_w, body_h);
        if waiting {
            ui::blit_tail(frame, &scratch, used, body);
        } else {
            frame.blit_rows(&scratch, 0, body);
        }
        height
    }

    fn rag_lines(width: u16) -> Vec<Line> {
        let inner = width.saturating_sub(2 + 2 * theme::SM);
        let mut lines = vec![
            Line::styled("STANDARD LLM (RAG)", theme::eyebrow(theme::RED)),
            Line::new(),
            Line::styled(RAG_PROMPT, theme::body()),
            Line::new(),
        ];
        let answer = Line::styled(RAG_ANSWER, theme::body().italic());
        let rail = theme::fg(theme::tint(theme::RED, 0.4));
        for row in wrap_line(&answer, usize::from(inner.saturating_sub(2).max(1))) {
            let mut railed = Line::styled("│ ", rail);
            railed.spans.extend(row.spans);
            lines.push(railed);
        }
        lines.push(Line::new());
        let chip = Style::new()
            .fg(theme::RED)
            .bg(theme::tint(theme::RED, 0.12));
        lines.extend(markdown::chip_rows(&RAG_WEAKNESSES, inner, chip));
        lines
    }

    fn cta(&self, frame: &mut Frame, y: u16, width: u16) -> u16 {
        let inner_w = width.saturating_sub(2 + 2 * theme::SM);
        let copy = Paragraph::new(vec![
            Line::styled(CTA_LEAD, theme::fg(theme::TEXT)),
            ui::fragments(&CTA, theme::fg(theme::TEXT)),
        ])
        .wrap(true)
        .alignment(Alignment::Center);
        let copy_h = copy.height(inner_w);
        let height = 2 + 1 + copy_h + 1 + 1 + 1 + 1 + 1;
        let inner = ui::panel(frame, Rect::new(0, y, width, height), theme::BORDER);
        copy.render(Rect::new(inner.x, inner.y + 1, inner.width, copy_h), frame);

        let button_y = inner.y + 1 + copy_h + 1;
        ui::centered_button(
            frame,
            inner.x,
            button_y,
            inner.width,
            CTA_BUTTON,
            theme::button(theme::ACCENT),
            COPY_LINK,
        );
        let shown = CTA_URL.trim_start_matches("https://");
        let note = if self.is_copied(CopyTarget::Link) {
            Line::new()
                .span(shown, theme::muted())
                .span("  ✓ Copied", theme::fg(theme::GREEN))
        } else {
            Line::styled(shown, theme::muted())
        };
        ui::centered(frame, inner.x, button_y + 1, inner.width, &note);
        height
    }
}

impl PhaseView for ChatPhase {
    type Message = Msg;

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Ask => self.question(1),
            Msg::FollowUp => self.question(3),
            Msg::Reveal(turn) => {
                if self.step != turn || self.typing.is_some() {
                    return Cmd::none();
                }
                let Some(chat) = CHAT.get(turn) else {
                    return Cmd::none();
                };
                let seed = self.jitter.next_u64();
                let mut writer = Typewriter::new(chat.text, Jitter::with_seed(seed));
                self.cursor.reset();
                let wake = writer.start();
                self.typing = Some(Typing { turn, writer });
                schedule(wake, move |wake| Msg::Type { turn, wake })
            }
            Msg::Type { turn, wake } => {
                let Some(typing) = self.typing.as_mut().filter(|t| t.turn == turn) else {
                    return Cmd::none();
                };
                let next = typing.writer.fire(wake);
                if typing.writer.is_complete() {
                    info!(turn, chars = typing.writer.revealed_chars(), "answer delivered");
                    self.typing = None;
                    self.step = turn + 1;
                    return Cmd::none();
                }
                schedule(next, move |wake| Msg::Type { turn, wake })
            }
            Msg::Copy(target) => {
                let ready = match target {
                    CopyTarget::Answer(turn) => self.step > turn,
                    CopyTarget::Link => true,
                };
                if !ready {
                    return Cmd::none();
                }
                Cmd::clipboard(target.text(), move |result| Msg::Copied { target, result })
            }
            Msg::Copied { target, result } => match result {
                Ok(()) => {
                    self.copy_token += 1;
                    self.copied = Some((target, self.copy_token));
                    Cmd::after(COPIED_FOR, Msg::CopyExpired(self.copy_token))
                }
                Err(err) => {
                    debug!(%err, ?target, "copy failed");
                    Cmd::none()
                }
            },
            Msg::CopyExpired(token) => {
                if self.copied.is_some_and(|(_, t)| t == token) {
                    self.copied = None;
                }
                Cmd::none()
            }
        }
    }

    fn key(&self, key: &KeyEvent) -> Option<Msg> {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => match self.step {
                0 => Some(Msg::Ask),
                2 => Some(Msg::FollowUp),
                _ => None,
            },
            KeyCode::Char('c') => self
                .last_answer()
                .map(|turn| Msg::Copy(CopyTarget::Answer(turn))),
            _ => None,
        }
    }

    fn click(&self, data: HitData) -> Option<Msg> {
        match data {
            ASK => Some(Msg::Ask),
            FOLLOW_UP => Some(Msg::FollowUp),
            COPY_FIRST => Some(Msg::Copy(CopyTarget::Answer(1))),
            COPY_SECOND => Some(Msg::Copy(CopyTarget::Answer(3))),
            COPY_LINK => Some(Msg::Copy(CopyTarget::Link)),
            _ => None,
        }
    }

    fn tick(&mut self, dt: Duration) {
        self.cursor.tick(dt);
        self.dots = self.dots.saturating_add(dt);
    }

    fn frame_interval(&self) -> Option<Duration> {
        (self.step % 2 == 1).then_some(BLINK)
    }

    fn view(&self, frame: &mut Frame, ctx: ViewCtx) -> u16 {
        let width = frame.width();
        let mut y = ui::phase_header(frame, width, 3, Some(CHAT_INTRO));

        if ctx.compact {
            let rag = Self::rag_lines(width);
            let h = ui::card_height(&rag, width);
            ui::card(frame, Rect::new(0, y, width, h), theme::BORDER, rag, Alignment::Left);
            y += h + 1;
            y += self.chat_panel(frame, 0, y, width, 0);
        } else {
            let col = width.saturating_sub(theme::SM) / 2;
            let right_x = col + theme::SM;
            let right_w = width.saturating_sub(right_x);
            let rag = Self::rag_lines(col);
            let rag_h = ui::card_height(&rag, col);
            let chat_h = self.chat_panel(frame, right_x, y, right_w, rag_h);
            ui::card(
                frame,
                Rect::new(0, y, col, rag_h.max(chat_h)),
                theme::BORDER,
                rag,
                Alignment::Left,
            );
            y += rag_h.max(chat_h);
        }

        y += 1;
        y += self.cta(frame, y, width);
        y
    }
}
