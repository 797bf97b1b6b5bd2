#![forbid(unsafe_code)]

//! Character-by-character text reveal.
//!
//! A [`Typewriter`] shows one `char` per wake. The wait after each character
//! depends on what was just typed:
//!
//! | just typed | wait |
//! |---|---|
//! | line break | 40 ms + 0..80 ms |
//! | space | 10 ms + 0..20 ms |
//! | `*` (emphasis marker) | 5 ms |
//! | anything else | 8 ms + 0..18 ms |
//!
//! Jitter comes from a [`Jitter`] generator; only ordering and completion are
//! guaranteed, never exact timing.

use std::time::Duration;

use super::{Jitter, Wake};
use crate::logging::debug;

/// Progress notifications, drained by the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingEvent {
    /// Another character is visible; carries the visible char count.
    Updated(usize),
    /// The whole text is visible.
    Completed,
}

/// Wait after typing `ch`.
pub fn char_delay(ch: char, jitter: &mut Jitter) -> Duration {
    let ms = match ch {
        '\n' => 40 + jitter.below(80),
        ' ' => 10 + jitter.below(20),
        '*' => 5,
        _ => 8 + jitter.below(18),
    };
    Duration::from_millis(ms)
}

/// Reveals a string one character at a time.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    /// Byte offset of the end of the visible prefix.
    cursor: usize,
    chars: usize,
    running: bool,
    complete: bool,
    epoch: u64,
    jitter: Jitter,
    events: Vec<TypingEvent>,
}

impl Typewriter {
    /// A typewriter that has not started yet.
    #[must_use]
    pub fn new(text: impl Into<String>, jitter: Jitter) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            chars: 0,
            running: false,
            complete: false,
            epoch: 0,
            jitter,
            events: Vec::new(),
        }
    }

    /// Begin typing. The first character is due immediately.
    ///
    /// Empty text completes on the spot and returns `None`.
    pub fn start(&mut self) -> Option<Wake> {
        if self.running || self.complete {
            return None;
        }
        if self.cursor >= self.text.len() {
            self.finish();
            return None;
        }
        self.running = true;
        Some(Wake::new(self.epoch, Duration::ZERO))
    }

    /// Reveal the next character and return the wake for the one after.
    pub fn fire(&mut self, wake: Wake) -> Option<Wake> {
        if wake.epoch() != self.epoch || !self.running {
            return None;
        }
        let ch = self.text[self.cursor..].chars().next()?;
        self.cursor += ch.len_utf8();
        self.chars += 1;
        self.events.push(TypingEvent::Updated(self.chars));

        if self.cursor >= self.text.len() {
            self.finish();
            return None;
        }
        Some(Wake::new(self.epoch, char_delay(ch, &mut self.jitter)))
    }

    /// Stop typing. Pending wakes become stale; the visible prefix stays.
    pub fn cancel(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.running = false;
    }

    /// Visible prefix.
    #[must_use]
    pub fn revealed(&self) -> &str {
        &self.text[..self.cursor]
    }

    /// Full text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of visible characters.
    #[must_use]
    pub const fn revealed_chars(&self) -> usize {
        self.chars
    }

    /// Whether a wake chain is live.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the whole text is visible.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> Vec<TypingEvent> {
        std::mem::take(&mut self.events)
    }

    fn finish(&mut self) {
        self.running = false;
        if !self.complete {
            self.complete = true;
            self.events.push(TypingEvent::Completed);
            debug!(chars = self.chars, "typewriter complete");
        }
    }
}
