#![forbid(unsafe_code)]

//! Animation primitives.
//!
//! Time-based helpers that turn elapsed [`Duration`]s into display values.
//! Nothing here schedules itself: owners call `tick(dt)` from their frame
//! subscription and read the value back during `view`.
//!
//! - Easing curves map `t` in [0, 1] to [0, 1].
//! - [`Pulse`] oscillates forever (blinking cursors, the "vs" badge).
//! - [`AnimatedCounter`] eases an integer from 0 to a target.
//! - [`staggered_count`] answers "how many list rows are visible yet".

pub mod counter;

use std::time::Duration;

pub use counter::{AnimatedCounter, with_thousands};

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f64) -> f64;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Cubic ease-out: `1 - (1 - t)^3`.
#[inline]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Normalized progress of `elapsed` through `duration`, clamped to [0, 1].
///
/// A zero duration is already complete.
#[inline]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Continuous oscillation between 0.0 and 1.0. Never completes.
#[derive(Debug, Clone, Copy)]
pub struct Pulse {
    period: Duration,
    elapsed: Duration,
}

impl Pulse {
    /// A pulse completing one full cycle every `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            period: if period.is_zero() {
                Duration::from_millis(1)
            } else {
                period
            },
            elapsed: Duration::ZERO,
        }
    }

    /// Advance the pulse by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        let total = self.elapsed.saturating_add(dt).as_nanos() % self.period.as_nanos();
        self.elapsed = Duration::from_nanos(total as u64);
    }

    /// Smooth value: 0 at the start of the cycle, 1 at its midpoint.
    pub fn value(&self) -> f64 {
        let phase = self.elapsed.as_secs_f64() / self.period.as_secs_f64();
        (1.0 - (phase * std::f64::consts::TAU).cos()) / 2.0
    }

    /// Square wave: `true` during the first half of each cycle.
    pub fn is_on(&self) -> bool {
        self.elapsed < self.period / 2
    }

    /// Restart the cycle.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

/// Number of rows visible at `elapsed` when row `i` appears at
/// `first + i * step`, capped at `count`.
pub fn staggered_count(elapsed: Duration, first: Duration, step: Duration, count: usize) -> usize {
    if elapsed < first {
        return 0;
    }
    if step.is_zero() {
        return count;
    }
    let since = elapsed - first;
    let shown = (since.as_nanos() / step.as_nanos()) as usize + 1;
    shown.min(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: fn(u64) -> Duration = Duration::from_millis;

    #[test]
    fn easing_endpoints() {
        for f in [linear, ease_out, ease_out_cubic, ease_in_out] {
            assert_eq!(f(0.0), 0.0);
            assert!((f(1.0) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn easing_clamps_out_of_range() {
        assert_eq!(ease_out_cubic(-3.0), 0.0);
        assert_eq!(ease_out_cubic(7.0), 1.0);
    }

    #[test]
    fn ease_out_cubic_front_loaded() {
        assert!(ease_out_cubic(0.5) > 0.5);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn progress_zero_duration_is_done() {
        assert_eq!(progress(Duration::ZERO, Duration::ZERO), 1.0);
    }

    #[test]
    fn pulse_wraps_and_toggles() {
        let mut p = Pulse::new(MS(800));
        assert!(p.is_on());
        p.tick(MS(500));
        assert!(!p.is_on());
        p.tick(MS(400));
        assert!(p.is_on());
        assert!(p.value() < 0.2);
    }

    #[test]
    fn stagger_reveals_in_steps() {
        let first = MS(300);
        let step = MS(150);
        assert_eq!(staggered_count(MS(299), first, step, 7), 0);
        assert_eq!(staggered_count(MS(300), first, step, 7), 1);
        assert_eq!(staggered_count(MS(449), first, step, 7), 1);
        assert_eq!(staggered_count(MS(450), first, step, 7), 2);
        assert_eq!(staggered_count(MS(10_000), first, step, 7), 7);
    }
}
