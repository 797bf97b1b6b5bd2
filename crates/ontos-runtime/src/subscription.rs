#![forbid(unsafe_code)]

//! Interval subscriptions.
//!
//! A model declares the subscriptions it wants from
//! [`Model::subscriptions`](crate::Model::subscriptions) and the runtime
//! reconciles that list after every update:
//!
//! - subscriptions whose ID is new start, first firing one interval later
//! - subscriptions whose ID disappeared stop immediately
//! - unchanged IDs keep their phase
//!
//! A 16 ms frame tick declared only while something animates therefore costs
//! nothing once the animation settles.

use std::time::Duration;

use tracing::{debug, trace};

/// A unique identifier for a subscription.
///
/// Subscriptions with the same ID are considered identical across updates.
pub type SubId = u64;

/// A source of messages delivered on a fixed interval.
pub trait Subscription<M> {
    /// Unique identifier for deduplication.
    fn id(&self) -> SubId;

    /// Time between deliveries.
    fn interval(&self) -> Duration;

    /// Build the message for one delivery. `elapsed` is the time since the
    /// previous delivery (or since the subscription started).
    fn message(&self, elapsed: Duration) -> M;
}

/// A subscription that fires at a regular interval.
pub struct Every<M> {
    id: SubId,
    interval: Duration,
    make_msg: Box<dyn Fn(Duration) -> M>,
}

impl<M> Every<M> {
    const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// Create a tick subscription whose ID is derived from the interval.
    pub fn new(interval: Duration, make_msg: impl Fn(Duration) -> M + 'static) -> Self {
        let id = interval.as_nanos() as u64 ^ 0x5449_434B;
        Self::with_id(id, interval, make_msg)
    }

    /// Create a tick subscription with an explicit ID.
    pub fn with_id(
        id: SubId,
        interval: Duration,
        make_msg: impl Fn(Duration) -> M + 'static,
    ) -> Self {
        Self {
            id,
            interval: interval.max(Self::MIN_INTERVAL),
            make_msg: Box::new(make_msg),
        }
    }
}

impl<M> Subscription<M> for Every<M> {
    fn id(&self) -> SubId {
        self.id
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn message(&self, elapsed: Duration) -> M {
        (self.make_msg)(elapsed)
    }
}

struct Active<M> {
    sub: Box<dyn Subscription<M>>,
    last_fired: Duration,
    next_due: Duration,
}

/// Tracks the running subscriptions and when each is next due.
pub(crate) struct SubscriptionSet<M> {
    active: Vec<Active<M>>,
}

impl<M> SubscriptionSet<M> {
    pub(crate) fn new() -> Self {
        Self { active: Vec::new() }
    }

    /// Replace the running set with `declared`, keeping the schedule of IDs
    /// that were already running.
    pub(crate) fn reconcile(&mut self, declared: Vec<Box<dyn Subscription<M>>>, now: Duration) {
        let mut next = Vec::with_capacity(declared.len());
        for sub in declared {
            let id = sub.id();
            if next.iter().any(|a: &Active<M>| a.sub.id() == id) {
                continue;
            }
            match self.active.iter().position(|a| a.sub.id() == id) {
                Some(i) => {
                    let kept = self.active.swap_remove(i);
                    next.push(Active {
                        sub,
                        last_fired: kept.last_fired,
                        next_due: kept.next_due,
                    });
                }
                None => {
                    debug!(sub_id = id, interval = ?sub.interval(), "starting subscription");
                    let next_due = now + sub.interval();
                    next.push(Active {
                        sub,
                        last_fired: now,
                        next_due,
                    });
                }
            }
        }
        for stopped in &self.active {
            debug!(sub_id = stopped.sub.id(), "stopping subscription");
        }
        self.active = next;
    }

    /// Earliest time any subscription is due.
    pub(crate) fn next_deadline(&self) -> Option<Duration> {
        self.active.iter().map(|a| a.next_due).min()
    }

    /// Messages for every subscription due at `now`, in declaration order.
    ///
    /// A subscription that fell more than one interval behind skips the
    /// missed deliveries instead of bursting.
    pub(crate) fn collect_due(&mut self, now: Duration) -> Vec<M> {
        let mut out = Vec::new();
        for a in &mut self.active {
            if a.next_due > now {
                continue;
            }
            let elapsed = now.saturating_sub(a.last_fired);
            trace!(sub_id = a.sub.id(), ?elapsed, "subscription fired");
            out.push(a.sub.message(elapsed));
            a.last_fired = now;
            a.next_due += a.sub.interval();
            if a.next_due <= now {
                a.next_due = now + a.sub.interval();
            }
        }
        out
    }

    pub(crate) fn len(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn clear(&mut self) {
        self.active.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn every(id: SubId, interval_ms: u64) -> Box<dyn Subscription<(SubId, Duration)>> {
        Box::new(Every::with_id(id, ms(interval_ms), move |dt| (id, dt)))
    }

    #[test]
    fn new_subscription_fires_one_interval_later() {
        let mut set = SubscriptionSet::new();
        set.reconcile(vec![every(1, 16)], ms(100));
        assert_eq!(set.next_deadline(), Some(ms(116)));
        assert!(set.collect_due(ms(115)).is_empty());
        assert_eq!(set.collect_due(ms(116)), vec![(1, ms(16))]);
        assert_eq!(set.next_deadline(), Some(ms(132)));
    }

    #[test]
    fn reconcile_keeps_phase_of_unchanged_ids() {
        let mut set = SubscriptionSet::new();
        set.reconcile(vec![every(1, 16)], ms(0));
        set.reconcile(vec![every(1, 16)], ms(10));
        assert_eq!(set.next_deadline(), Some(ms(16)));
    }

    #[test]
    fn reconcile_stops_undeclared() {
        let mut set = SubscriptionSet::new();
        set.reconcile(vec![every(1, 16), every(2, 500)], ms(0));
        assert_eq!(set.len(), 2);
        set.reconcile(vec![every(2, 500)], ms(5));
        assert_eq!(set.len(), 1);
        assert_eq!(set.next_deadline(), Some(ms(500)));
    }

    #[test]
    fn duplicate_ids_collapse() {
        let mut set = SubscriptionSet::new();
        set.reconcile(vec![every(7, 16), every(7, 16)], ms(0));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn lagging_subscription_skips_missed_ticks() {
        let mut set = SubscriptionSet::new();
        set.reconcile(vec![every(1, 10)], ms(0));
        assert_eq!(set.collect_due(ms(95)), vec![(1, ms(95))]);
        assert_eq!(set.next_deadline(), Some(ms(105)));
    }

    #[test]
    fn interval_derived_ids_match() {
        let a = Every::new(ms(16), |_| ());
        let b = Every::new(ms(16), |_| ());
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), Every::new(ms(500), |_| ()).id());
    }

    #[test]
    fn zero_interval_is_clamped() {
        let e = Every::new(Duration::ZERO, |_| ());
        assert_eq!(e.interval(), ms(1));
    }
}
