#![forbid(unsafe_code)]

//! Panic containment for phase views.
//!
//! A phase that panics while drawing is replaced by a fallback panel until
//! the viewer retries. The error is remembered across frames so a view that
//! panics on every render is not re-run on every frame; `view` only has
//! `&self`, hence the interior mutability.

use std::cell::RefCell;

use ontos_core::geometry::Rect;
use ontos_render::frame::Frame;
use ontos_render::text::Line;
use ontos_runtime::session;
use tracing::warn;

use crate::theme;
use crate::ui::{self, hit};

const RETRY_LABEL: &str = "Retry";

#[derive(Debug, Default)]
pub struct ErrorBoundary {
    error: RefCell<Option<String>>,
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message of the captured panic, if any.
    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn is_failed(&self) -> bool {
        self.error.borrow().is_some()
    }

    /// Record a failure as if the view had panicked with `message`.
    pub fn record(&self, message: impl Into<String>) {
        *self.error.borrow_mut() = Some(message.into());
    }

    /// Forget the failure so the next frame runs the view again.
    pub fn clear(&self) {
        if self.error.borrow_mut().take().is_some() {
            warn!("retrying failed phase view");
        }
    }

    /// Run `draw` into `frame`, or draw the fallback for `name` if it
    /// panics (or panicked before). Returns rows used.
    pub fn render(&self, frame: &mut Frame, name: &str, draw: impl FnOnce(&mut Frame) -> u16) -> u16 {
        if !self.is_failed() {
            match session::catch_panic(|| draw(&mut *frame)) {
                Ok(used) => return used,
                Err(message) => {
                    warn!(phase = name, %message, "phase view panicked");
                    self.record(message);
                }
            }
        }
        frame.clear();
        let area = frame.bounds();
        frame.fill_bg(area, theme::page());
        let message = self.error().unwrap_or_default();
        fallback(frame, name, &message)
    }
}

/// The replacement panel. Returns rows used.
pub fn fallback(frame: &mut Frame, name: &str, message: &str) -> u16 {
    let width = frame.width();
    let inner_w = width.saturating_sub(2 + 2 * theme::SM);
    let lines = vec![
        Line::styled(format!("RENDERING ERROR — {name}"), theme::eyebrow(theme::RED)),
        Line::new(),
        Line::styled(message, theme::body()),
        Line::new(),
        Line::styled("Press R to render this phase again.", theme::muted()),
    ];
    let text_h = ontos_render::widgets::Paragraph::new(lines.clone())
        .wrap(true)
        .height(inner_w);
    let height = text_h + 2 + 2;
    let inner = ui::panel(frame, Rect::new(0, 1, width, height), theme::RED);
    ui::wrapped(frame, inner.x, inner.y, inner.width, lines);
    ui::button(
        frame,
        inner.x,
        inner.y + text_h + 1,
        RETRY_LABEL,
        theme::button(theme::RED),
        hit::RETRY,
        0,
    );
    height + 1
}
