#![forbid(unsafe_code)]

//! Timed playback: scripted lines and typed text.
//!
//! Both players are plain state machines. They never sleep or spawn; instead
//! every step hands back a [`Wake`] describing how long the owner should wait
//! before calling `fire` again. The owner schedules it however it likes (the
//! runtime turns it into a one-shot timer message).
//!
//! # Cancellation
//!
//! Each player carries an epoch. Every [`Wake`] is stamped with the epoch it
//! was issued under, and `cancel`/`replay` bump the epoch. `fire` compares
//! epochs before touching any state, so a timer that was already queued when
//! the run was cancelled is a no-op when it finally arrives.
//!
//! # Events
//!
//! Progress is reported through an internal queue drained with
//! `drain_events()`, the same polling style the animation module uses.

pub mod sequencer;
pub mod typewriter;

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use sequencer::{PlaybackEvent, PlaybackStatus, Sequencer, Timed};
pub use typewriter::{Typewriter, TypingEvent, char_delay};

/// A request to be called back after `after` has elapsed.
///
/// Only the player that issued a wake can interpret it; a wake from an older
/// epoch is rejected without side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    epoch: u64,
    after: Duration,
}

impl Wake {
    pub(crate) const fn new(epoch: u64, after: Duration) -> Self {
        Self { epoch, after }
    }

    /// Epoch the wake was issued under.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Delay before the owner should fire this wake.
    #[must_use]
    pub const fn after(&self) -> Duration {
        self.after
    }
}

/// Small deterministic PRNG (xorshift64) for timing jitter.
///
/// Typing delays are deliberately irregular; tests pin the seed so runs are
/// reproducible, the binary seeds from process entropy.
#[derive(Debug, Clone)]
pub struct Jitter {
    state: u64,
}

impl Jitter {
    const FALLBACK_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

    /// Seeded generator. A zero seed is replaced (xorshift would stick at 0).
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Generator seeded from the process hash keys and the wall clock.
    #[must_use]
    pub fn from_entropy() -> Self {
        let mut hasher = RandomState::new().build_hasher();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        hasher.write_u128(nanos);
        Self::with_seed(hasher.finish())
    }

    /// Next raw value.
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform-ish value in `[0, bound)`. Returns 0 for a zero bound.
    pub fn below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.next_u64() % bound
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::with_seed(Self::FALLBACK_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_seed_does_not_stick() {
        let mut j = Jitter::with_seed(0);
        assert_ne!(j.next_u64(), 0);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Jitter::with_seed(42);
        let mut b = Jitter::with_seed(42);
        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn below_respects_bound() {
        let mut j = Jitter::with_seed(7);
        for _ in 0..1000 {
            assert!(j.below(80) < 80);
        }
        assert_eq!(j.below(0), 0);
    }
}
