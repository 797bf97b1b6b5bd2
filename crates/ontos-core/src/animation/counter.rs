#![forbid(unsafe_code)]

//! Eased integer counter.
//!
//! [`AnimatedCounter`] counts from 0 up to a target over a fixed duration
//! using [`ease_out_cubic`](super::ease_out_cubic):
//!
//! ```text
//! value(t) = round(target * (1 - (1 - t)^3)),  t = clamp(elapsed / duration, 0, 1)
//! ```
//!
//! # Invariants
//!
//! 1. `value()` is non-decreasing across `tick` calls.
//! 2. Once `elapsed >= duration`, `value() == target` exactly.
//! 3. [`retarget`](AnimatedCounter::retarget) restarts from 0 only when the
//!    target or the duration actually changes.

use std::time::Duration;

use super::{ease_out_cubic, progress};

/// An integer that eases from 0 to `target` over `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimatedCounter {
    target: u64,
    duration: Duration,
    elapsed: Duration,
}

impl AnimatedCounter {
    /// A counter at 0 that will reach `target` after `duration`.
    #[must_use]
    pub const fn new(target: u64, duration: Duration) -> Self {
        Self {
            target,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Advance by `dt`. Elapsed time saturates at the duration.
    pub fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    /// Current displayed value.
    #[must_use]
    pub fn value(&self) -> u64 {
        if self.is_complete() {
            return self.target;
        }
        let t = progress(self.elapsed, self.duration);
        let v = (self.target as f64 * ease_out_cubic(t)).round() as u64;
        v.min(self.target)
    }

    /// Whether the counter has settled on its target.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Target value.
    #[must_use]
    pub const fn target(&self) -> u64 {
        self.target
    }

    /// Animation duration.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Change the target or duration.
    ///
    /// Returns `true` when either changed and the counter restarted from 0.
    /// Identical parameters leave the animation untouched.
    pub fn retarget(&mut self, target: u64, duration: Duration) -> bool {
        if target == self.target && duration == self.duration {
            return false;
        }
        *self = Self::new(target, duration);
        true
    }

    /// Restart from 0 with the same parameters.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

/// Format with `,` thousands separators (`28400` becomes `"28,400"`).
pub fn with_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
