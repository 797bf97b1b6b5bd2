#![forbid(unsafe_code)]

//! Timed-line sequencer.
//!
//! A [`Sequencer`] reveals scripted lines one at a time. Lines carry an
//! absolute offset from the start of their transcript; the wait before line
//! `i` is `offset[i] - offset[i - 1]`, and the first line of a run is shown
//! immediately.
//!
//! A sequencer may hold several *segments* (for example two terminal ticks
//! separated by a user gesture). Finishing a segment that is not the last
//! one pauses the sequencer; the owner calls [`start`](Sequencer::start)
//! again to play the next one.
//!
//! # Invariants
//!
//! 1. Each accepted `fire` reveals exactly one line.
//! 2. `revealed_count()` visits every integer from 0 to `len()` once.
//! 3. `Completed` is queued exactly once, after the final line, and never
//!    as a consequence of `cancel`.
//! 4. A wake from an earlier epoch mutates nothing.
//!
//! # Failure Modes
//!
//! - Offsets that go backwards are treated as a zero wait.
//! - An empty segment finishes as soon as it is started.

use std::time::Duration;

use super::Wake;
use crate::logging::{debug, trace};

/// Anything with a scheduled offset in milliseconds from transcript start.
pub trait Timed {
    /// Offset of this item from the start of its transcript.
    fn offset_ms(&self) -> u64;
}

impl Timed for u64 {
    fn offset_ms(&self) -> u64 {
        *self
    }
}

/// Where the sequencer is in its script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Not playing. Either never started or cancelled mid-run.
    #[default]
    Idle,
    /// A wake chain is live.
    Running,
    /// A segment finished and another one is waiting to be started.
    PausedBetween,
    /// Every line of every segment has been revealed.
    Complete,
}

/// Progress notifications, drained by the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// One more line is visible; carries the new total revealed count.
    Advanced(usize),
    /// A non-final segment finished (index of the finished segment).
    SegmentFinished(usize),
    /// The final line of the final segment is visible.
    Completed,
}

/// Reveals segments of timed lines through a chain of [`Wake`]s.
#[derive(Debug, Clone)]
pub struct Sequencer {
    /// Per-segment waits before each line (first entry of each is zero).
    delays: Vec<Vec<Duration>>,
    segment: usize,
    /// Lines revealed in the current segment.
    position: usize,
    status: PlaybackStatus,
    epoch: u64,
    events: Vec<PlaybackEvent>,
}

impl Sequencer {
    /// Sequencer over a single transcript.
    #[must_use]
    pub fn single<T: Timed>(lines: &[T]) -> Self {
        Self::segmented(&[lines])
    }

    /// Sequencer over several transcripts played one after another.
    #[must_use]
    pub fn segmented<T: Timed>(segments: &[&[T]]) -> Self {
        let delays = segments
            .iter()
            .map(|lines| {
                let mut prev = None;
                lines
                    .iter()
                    .map(|line| {
                        let offset = line.offset_ms();
                        let wait = prev.map_or(0, |p: u64| offset.saturating_sub(p));
                        prev = Some(offset);
                        Duration::from_millis(wait)
                    })
                    .collect()
            })
            .collect();
        Self {
            delays,
            segment: 0,
            position: 0,
            status: PlaybackStatus::Idle,
            epoch: 0,
            events: Vec::new(),
        }
    }

    /// Begin (or resume) the current segment.
    ///
    /// Returns the first wake, due immediately. Returns `None` when already
    /// running, when everything has played, or when the segment is empty and
    /// finished on the spot.
    pub fn start(&mut self) -> Option<Wake> {
        match self.status {
            PlaybackStatus::Running | PlaybackStatus::Complete => return None,
            PlaybackStatus::Idle | PlaybackStatus::PausedBetween => {}
        }
        if self.segment >= self.delays.len() {
            self.finish_all();
            return None;
        }
        debug!(segment = self.segment, epoch = self.epoch, "sequencer start");
        self.status = PlaybackStatus::Running;
        if self.position >= self.segment_len(self.segment) {
            self.finish_segment();
            return None;
        }
        Some(Wake::new(self.epoch, Duration::ZERO))
    }

    /// Handle a wake previously returned by `start` or `fire`.
    ///
    /// Reveals one line and returns the wake for the next one, or `None`
    /// when the segment is done or the wake is stale.
    pub fn fire(&mut self, wake: Wake) -> Option<Wake> {
        if wake.epoch() != self.epoch || self.status != PlaybackStatus::Running {
            trace!(
                wake_epoch = wake.epoch(),
                epoch = self.epoch,
                "sequencer ignored stale wake"
            );
            return None;
        }
        self.position += 1;
        self.events
            .push(PlaybackEvent::Advanced(self.revealed_count()));

        let next = self.delays[self.segment].get(self.position).copied();
        match next {
            Some(after) => Some(Wake::new(self.epoch, after)),
            None => {
                self.finish_segment();
                None
            }
        }
    }

    /// Stop the current run. Pending wakes become stale; revealed lines stay.
    pub fn cancel(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.status == PlaybackStatus::Running {
            self.status = PlaybackStatus::Idle;
        }
    }

    /// Cancel and rewind to the very beginning.
    pub fn replay(&mut self) {
        self.cancel();
        self.segment = 0;
        self.position = 0;
        self.status = PlaybackStatus::Idle;
        self.events.clear();
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Current epoch.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Index of the segment that is playing or will play next.
    #[must_use]
    pub fn current_segment(&self) -> usize {
        self.segment.min(self.delays.len().saturating_sub(1))
    }

    /// Number of segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.delays.len()
    }

    /// Lines across all segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.delays.iter().map(Vec::len).sum()
    }

    /// Whether there are no lines at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lines revealed across all segments.
    #[must_use]
    pub fn revealed_count(&self) -> usize {
        (0..self.delays.len()).map(|i| self.revealed_in(i)).sum()
    }

    /// Lines revealed in segment `index`.
    #[must_use]
    pub fn revealed_in(&self, index: usize) -> usize {
        match index.cmp(&self.segment) {
            std::cmp::Ordering::Less => self.segment_len(index),
            std::cmp::Ordering::Equal => self.position.min(self.segment_len(index)),
            std::cmp::Ordering::Greater => 0,
        }
    }

    /// Whether the final line has been revealed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == PlaybackStatus::Complete
    }

    fn segment_len(&self, index: usize) -> usize {
        self.delays.get(index).map_or(0, Vec::len)
    }

    fn finish_segment(&mut self) {
        let finished = self.segment;
        if finished + 1 < self.delays.len() {
            self.segment += 1;
            self.position = 0;
            self.status = PlaybackStatus::PausedBetween;
            self.events.push(PlaybackEvent::SegmentFinished(finished));
            debug!(segment = finished, "sequencer segment finished");
        } else {
            self.finish_all();
        }
    }

    fn finish_all(&mut self) {
        if self.status == PlaybackStatus::Complete {
            return;
        }
        self.status = PlaybackStatus::Complete;
        self.events.push(PlaybackEvent::Completed);
        debug!(lines = self.len(), "sequencer complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(seq: &mut Sequencer) -> Vec<Duration> {
        let mut waits = Vec::new();
        let mut next = seq.start();
        while let Some(wake) = next {
            waits.push(wake.after());
            next = seq.fire(wake);
        }
        waits
    }

    #[test]
    fn waits_are_offset_differences() {
        let offsets: [u64; 4] = [0, 100, 100, 350];
        let mut seq = Sequencer::single(&offsets);
        let waits = run(&mut seq);
        assert_eq!(
            waits,
            vec![
                Duration::ZERO,
                Duration::from_millis(100),
                Duration::ZERO,
                Duration::from_millis(250),
            ]
        );
        assert!(seq.is_complete());
        assert_eq!(seq.revealed_count(), 4);
    }

    #[test]
    fn first_line_is_immediate_even_with_late_offset() {
        let offsets: [u64; 2] = [500, 700];
        let mut seq = Sequencer::single(&offsets);
        assert_eq!(seq.start().map(|w| w.after()), Some(Duration::ZERO));
    }

    #[test]
    fn events_in_order_with_single_completion() {
        let offsets: [u64; 3] = [0, 10, 20];
        let mut seq = Sequencer::single(&offsets);
        run(&mut seq);
        assert_eq!(
            seq.drain_events(),
            vec![
                PlaybackEvent::Advanced(1),
                PlaybackEvent::Advanced(2),
                PlaybackEvent::Advanced(3),
                PlaybackEvent::Completed,
            ]
        );
        assert!(seq.start().is_none());
        assert!(seq.drain_events().is_empty());
    }

    #[test]
    fn empty_sequence_completes_immediately() {
        let offsets: [u64; 0] = [];
        let mut seq = Sequencer::single(&offsets);
        assert!(seq.start().is_none());
        assert!(seq.is_complete());
        assert_eq!(seq.revealed_count(), 0);
        assert_eq!(seq.drain_events(), vec![PlaybackEvent::Completed]);
    }

    #[test]
    fn cancel_rejects_pending_wake() {
        let offsets: [u64; 3] = [0, 10, 20];
        let mut seq = Sequencer::single(&offsets);
        let first = seq.start().expect("first wake");
        let second = seq.fire(first).expect("second wake");
        seq.drain_events();
        seq.cancel();
        assert!(seq.fire(second).is_none());
        assert_eq!(seq.revealed_count(), 1);
        assert!(seq.drain_events().is_empty());
        assert_eq!(seq.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn replay_discards_old_chain() {
        let offsets: [u64; 2] = [0, 10];
        let mut seq = Sequencer::single(&offsets);
        let old = seq.start().expect("wake");
        seq.replay();
        let fresh = seq.start().expect("wake");
        assert!(seq.fire(old).is_none());
        assert_eq!(seq.revealed_count(), 0);
        assert!(seq.fire(fresh).is_some());
        assert_eq!(seq.revealed_count(), 1);
    }

    #[test]
    fn segments_pause_between() {
        let a: [u64; 2] = [0, 10];
        let b: [u64; 3] = [0, 5, 9];
        let mut seq = Sequencer::segmented(&[&a[..], &b[..]]);
        run(&mut seq);
        assert_eq!(seq.status(), PlaybackStatus::PausedBetween);
        assert_eq!(seq.revealed_in(0), 2);
        assert_eq!(seq.revealed_in(1), 0);
        assert_eq!(seq.current_segment(), 1);

        run(&mut seq);
        assert!(seq.is_complete());
        assert_eq!(seq.revealed_in(1), 3);
        assert_eq!(seq.revealed_count(), 5);
        let events = seq.drain_events();
        assert_eq!(events[2], PlaybackEvent::SegmentFinished(0));
        assert_eq!(events.last(), Some(&PlaybackEvent::Completed));
        assert_eq!(
            events
                .iter()
                .filter(|e| **e == PlaybackEvent::Completed)
                .count(),
            1
        );
    }

    #[test]
    fn backwards_offsets_wait_zero() {
        let offsets: [u64; 2] = [300, 100];
        let mut seq = Sequencer::single(&offsets);
        let waits = run(&mut seq);
        assert_eq!(waits[1], Duration::ZERO);
    }

    #[test]
    fn resume_after_cancel_continues() {
        let offsets: [u64; 3] = [0, 10, 20];
        let mut seq = Sequencer::single(&offsets);
        let w = seq.start().expect("wake");
        seq.fire(w);
        seq.cancel();
        let resumed = seq.start().expect("resume wake");
        assert_eq!(resumed.after(), Duration::ZERO);
        seq.fire(resumed);
        assert_eq!(seq.revealed_count(), 2);
    }
}
