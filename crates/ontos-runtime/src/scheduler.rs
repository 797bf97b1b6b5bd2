#![forbid(unsafe_code)]

//! One-shot timer queue.
//!
//! Timers are ordered by deadline, then by insertion order, so two timers
//! due at the same instant fire in the order they were requested. Deadlines
//! are offsets from program start rather than wall-clock instants; the real
//! runtime and the simulator feed the same queue with different clocks.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

struct Entry<M> {
    deadline: Duration,
    seq: u64,
    msg: M,
}

impl<M> PartialEq for Entry<M> {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl<M> Eq for Entry<M> {}

impl<M> PartialOrd for Entry<M> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<M> Ord for Entry<M> {
    // Reversed: BinaryHeap is a max-heap and we want the earliest first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Pending one-shot timers.
pub struct TimerQueue<M> {
    heap: BinaryHeap<Entry<M>>,
    next_seq: u64,
}

impl<M> TimerQueue<M> {
    /// An empty queue.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `msg` for delivery at `deadline`.
    pub fn schedule(&mut self, deadline: Duration, msg: M) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { deadline, seq, msg });
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.heap.peek().map(|e| e.deadline)
    }

    /// Remove and return the earliest timer if it is due at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<M> {
        if self.heap.peek()?.deadline > now {
            return None;
        }
        self.heap.pop().map(|e| e.msg)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl<M> Default for TimerQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn earliest_deadline_first() {
        let mut q = TimerQueue::new();
        q.schedule(ms(30), "c");
        q.schedule(ms(10), "a");
        q.schedule(ms(20), "b");
        assert_eq!(q.next_deadline(), Some(ms(10)));
        assert_eq!(q.pop_due(ms(100)), Some("a"));
        assert_eq!(q.pop_due(ms(100)), Some("b"));
        assert_eq!(q.pop_due(ms(100)), Some("c"));
        assert!(q.is_empty());
    }

    #[test]
    fn ties_fire_in_insertion_order() {
        let mut q = TimerQueue::new();
        for name in ["first", "second", "third"] {
            q.schedule(ms(5), name);
        }
        let order: Vec<_> = std::iter::from_fn(|| q.pop_due(ms(5))).collect();
        assert_eq!(order, ["first", "second", "third"]);
    }

    #[test]
    fn nothing_due_before_deadline() {
        let mut q = TimerQueue::new();
        q.schedule(ms(50), 1);
        assert_eq!(q.pop_due(ms(49)), None);
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop_due(ms(50)), Some(1));
    }

    #[test]
    fn clear_drops_pending() {
        let mut q = TimerQueue::new();
        q.schedule(ms(1), ());
        q.clear();
        assert_eq!(q.next_deadline(), None);
    }
}
