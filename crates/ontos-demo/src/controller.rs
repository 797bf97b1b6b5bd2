#![forbid(unsafe_code)]

//! Phase navigation state.
//!
//! The controller is the only owner of the current phase index and the
//! auto-advance flag. Every change of phase bumps the *mount id*; the app
//! tags each phase-local timer with the mount id it was scheduled under and
//! drops deliveries whose id no longer matches, so a view that has been
//! navigated away from can never be mutated by its own leftover timers.

use std::time::Duration;

use tracing::debug;

use crate::fixtures::{PHASES, PhaseDescriptor};

/// Number of phases in the walkthrough.
pub const PHASE_COUNT: usize = PHASES.len();

/// Time spent on each phase while auto-advance is on.
pub const AUTO_ADVANCE_INTERVAL: Duration = Duration::from_secs(15);

/// A phase index outside `0..PHASE_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPhase(pub usize);

impl std::fmt::Display for InvalidPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "phase {} out of range (0..={})",
            self.0,
            PHASE_COUNT - 1
        )
    }
}

impl std::error::Error for InvalidPhase {}

/// Current phase, auto-advance flag and mount identity.
#[derive(Debug, Clone)]
pub struct PhaseController {
    index: usize,
    auto_advance: bool,
    mount_id: u64,
}

impl Default for PhaseController {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PhaseController {
    /// Start at `index`, clamped into range.
    pub fn new(index: usize) -> Self {
        Self {
            index: index.min(PHASE_COUNT - 1),
            auto_advance: false,
            mount_id: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn descriptor(&self) -> &'static PhaseDescriptor {
        &PHASES[self.index]
    }

    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == PHASE_COUNT
    }

    /// Identity of the currently mounted phase view.
    pub fn mount_id(&self) -> u64 {
        self.mount_id
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    /// Advance one phase. At the last phase nothing moves and auto-advance
    /// switches off. Returns whether a new view was mounted.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            self.set_auto_advance(false);
            return false;
        }
        self.mount(self.index + 1);
        true
    }

    /// Go back one phase, saturating at the first.
    pub fn prev(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.mount(self.index - 1);
        true
    }

    /// Go straight to `index`. Selecting the current phase is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPhase`] when `index` is not a phase.
    pub fn jump_to(&mut self, index: usize) -> Result<bool, InvalidPhase> {
        if index >= PHASE_COUNT {
            return Err(InvalidPhase(index));
        }
        if index == self.index {
            return Ok(false);
        }
        self.mount(index);
        Ok(true)
    }

    /// Back to the first phase with a fresh view, even if already there.
    pub fn restart(&mut self) {
        self.mount(0);
    }

    pub fn set_auto_advance(&mut self, on: bool) {
        if self.auto_advance != on {
            debug!(on, "auto-advance toggled");
        }
        self.auto_advance = on;
    }

    /// Flip auto-advance; returns the new state.
    pub fn toggle_auto_advance(&mut self) -> bool {
        self.set_auto_advance(!self.auto_advance);
        self.auto_advance
    }

    /// One auto-advance interval elapsed.
    pub fn auto_tick(&mut self) -> bool {
        if !self.auto_advance {
            return false;
        }
        self.next()
    }

    fn mount(&mut self, index: usize) {
        let from = self.index;
        self.index = index;
        self.mount_id = self.mount_id.wrapping_add(1);
        debug!(from, to = index, mount_id = self.mount_id, "phase mounted");
    }
}
