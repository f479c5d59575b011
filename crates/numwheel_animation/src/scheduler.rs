//! Tick scheduling
//!
//! The [`Scheduler`] trait is the only way animation code learns about time:
//! it hands out fire-once tick callbacks and answers "what time is it now".
//! Anything periodic re-schedules itself from inside its own callback.
//!
//! [`ManualScheduler`] is a virtual-time implementation. Time only moves when
//! the owner calls [`ManualScheduler::advance`], which makes it suitable both
//! for deterministic tests and for hosts that pump it from a real clock.

use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

new_key_type! {
    /// Handle to a scheduled tick callback
    pub struct TickCallbackId;
}

/// Fire-once callback; receives the time at which it fired
pub type TickCallback = Box<dyn FnOnce(Duration)>;

/// Source of ticks and of the current time
///
/// Times are measured from the scheduler's own epoch.
pub trait Scheduler {
    /// Current time since the scheduler's epoch
    fn now(&self) -> Duration;

    /// Run `callback` once, `delay` from now
    fn schedule_tick(&self, delay: Duration, callback: TickCallback) -> TickCallbackId;

    /// Cancel a pending callback
    ///
    /// Returns `false` if the callback already fired or was cancelled.
    fn cancel_tick(&self, id: TickCallbackId) -> bool;
}

struct PendingTick {
    due: Duration,
    callback: TickCallback,
}

/// Internal state of the manual scheduler
struct SchedulerInner {
    now: Duration,
    ticks: SlotMap<TickCallbackId, PendingTick>,
    /// Min-heap on (due, sequence); entries for cancelled ticks are skipped
    queue: BinaryHeap<Reverse<(Duration, u64, TickCallbackId)>>,
    next_seq: u64,
}

impl SchedulerInner {
    /// Remove and return the earliest live tick due at or before `limit`
    fn pop_due(&mut self, limit: Duration) -> Option<PendingTick> {
        while let Some(Reverse((due, _, id))) = self.queue.peek().copied() {
            if !self.ticks.contains_key(id) {
                self.queue.pop();
                continue;
            }
            if due > limit {
                return None;
            }
            self.queue.pop();
            return self.ticks.remove(id);
        }
        None
    }
}

/// Virtual-time scheduler
///
/// Cloning produces another handle to the same clock and queue. Callbacks run
/// on the thread calling [`advance`](Self::advance), in due order, with ties
/// broken by scheduling order.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
/// use numwheel_animation::{ManualScheduler, Scheduler};
///
/// let scheduler = ManualScheduler::new();
/// let fired = Rc::new(Cell::new(None));
/// let sink = fired.clone();
/// scheduler.schedule_tick(Duration::from_millis(10), Box::new(move |now| sink.set(Some(now))));
///
/// scheduler.advance(Duration::from_millis(25));
/// assert_eq!(fired.get(), Some(Duration::from_millis(10)));
/// assert_eq!(scheduler.now(), Duration::from_millis(25));
/// ```
#[derive(Clone)]
pub struct ManualScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                now: Duration::ZERO,
                ticks: SlotMap::with_key(),
                queue: BinaryHeap::new(),
                next_seq: 0,
            })),
        }
    }

    /// Move time forward by `by`, firing every callback that falls due
    ///
    /// Each callback observes the clock at its own due time (or at the
    /// current time if it was already overdue). Callbacks scheduled while
    /// advancing fire in the same call if they fall due before the end.
    /// A callback that keeps re-scheduling itself with a zero delay never
    /// lets this return.
    pub fn advance(&self, by: Duration) {
        let target = self.inner.borrow().now.saturating_add(by);

        loop {
            let fired = {
                let mut inner = self.inner.borrow_mut();
                match inner.pop_due(target) {
                    Some(tick) => {
                        inner.now = inner.now.max(tick.due);
                        Some((inner.now, tick.callback))
                    }
                    None => None,
                }
            };

            // The borrow is released so the callback can re-schedule
            match fired {
                Some((now, callback)) => callback(now),
                None => break,
            }
        }

        let mut inner = self.inner.borrow_mut();
        inner.now = inner.now.max(target);
    }

    /// Advance to an absolute time; no-op if `time` is in the past
    pub fn advance_to(&self, time: Duration) {
        let now = self.now();
        if time > now {
            self.advance(time - now);
        }
    }

    /// Move the clock without firing anything
    ///
    /// Simulates a scheduler that was blocked: callbacks that became overdue
    /// fire late, at the current time, on the next [`advance`](Self::advance).
    pub fn stall(&self, by: Duration) {
        let mut inner = self.inner.borrow_mut();
        inner.now = inner.now.saturating_add(by);
    }

    /// Number of callbacks waiting to fire
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().ticks.len()
    }

    /// Due time of the earliest pending callback
    pub fn next_due(&self) -> Option<Duration> {
        self.inner.borrow().ticks.values().map(|tick| tick.due).min()
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &inner.now)
            .field("pending", &inner.ticks.len())
            .finish()
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    fn schedule_tick(&self, delay: Duration, callback: TickCallback) -> TickCallbackId {
        let mut inner = self.inner.borrow_mut();
        let due = inner.now.saturating_add(delay);
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let id = inner.ticks.insert(PendingTick { due, callback });
        inner.queue.push(Reverse((due, seq, id)));
        id
    }

    fn cancel_tick(&self, id: TickCallbackId) -> bool {
        self.inner.borrow_mut().ticks.remove(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_fires_in_due_order() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, name) in [(30, "c"), (10, "a"), (20, "b"), (10, "a2")] {
            let log = log.clone();
            scheduler.schedule_tick(
                ms(delay),
                Box::new(move |now| log.borrow_mut().push((name, now))),
            );
        }

        scheduler.advance(ms(25));
        assert_eq!(
            *log.borrow(),
            vec![("a", ms(10)), ("a2", ms(10)), ("b", ms(20))]
        );
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.next_due(), Some(ms(30)));
    }

    #[test]
    fn test_callbacks_can_reschedule() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(Cell::new(0u32));

        fn every_10ms(scheduler: ManualScheduler, count: Rc<Cell<u32>>) {
            let next = scheduler.clone();
            scheduler.schedule_tick(
                Duration::from_millis(10),
                Box::new(move |_| {
                    count.set(count.get() + 1);
                    every_10ms(next, count);
                }),
            );
        }

        every_10ms(scheduler.clone(), count.clone());
        scheduler.advance(ms(100));

        assert_eq!(count.get(), 10);
        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.now(), ms(100));
    }

    #[test]
    fn test_cancel_tick() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let sink = fired.clone();

        let id = scheduler.schedule_tick(ms(5), Box::new(move |_| sink.set(true)));
        assert!(scheduler.cancel_tick(id));
        assert!(!scheduler.cancel_tick(id));

        scheduler.advance(ms(10));
        assert!(!fired.get());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_stall_fires_late() {
        let scheduler = ManualScheduler::new();
        let fired_at = Rc::new(Cell::new(None));
        let sink = fired_at.clone();

        scheduler.schedule_tick(ms(10), Box::new(move |now| sink.set(Some(now))));
        scheduler.stall(ms(400));
        assert_eq!(fired_at.get(), None);

        scheduler.advance(Duration::ZERO);
        assert_eq!(fired_at.get(), Some(ms(400)));
    }

    #[test]
    fn test_advance_to_past_is_noop() {
        let scheduler = ManualScheduler::new();
        scheduler.advance(ms(50));
        scheduler.advance_to(ms(20));
        assert_eq!(scheduler.now(), ms(50));

        scheduler.advance_to(ms(80));
        assert_eq!(scheduler.now(), ms(80));
    }
}
