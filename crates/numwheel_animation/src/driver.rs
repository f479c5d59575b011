//! Linear transition driver
//!
//! A [`TransitionDriver`] moves a value from a start to an end over a fixed
//! duration. It never reads a clock: callers feed it elapsed-time deltas via
//! [`TransitionDriver::advance`], which makes it fully deterministic.
//!
//! ```
//! use std::time::Duration;
//! use numwheel_animation::TransitionDriver;
//!
//! let mut driver = TransitionDriver::new(0.0_f32, 100.0, Duration::from_millis(200));
//! assert!(driver.advance(Duration::from_millis(100)).is_none());
//! assert_eq!(driver.value(), 50.0);
//! assert!(driver.advance(Duration::from_millis(100)).is_some());
//! ```

use std::time::Duration;

use crate::values::Interpolate;

/// Lifecycle of a driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Still moving towards the end value
    Running,
    /// Reached the end value; the completion has been reported
    Completed,
    /// Stopped before completion; no completion will ever be reported
    Cancelled,
}

/// Reported exactly once, by the `advance` call that reaches the duration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Completion {
    /// Part of the final delta that fell past the end of the transition
    pub overshoot: Duration,
}

/// Drives one linear transition between two values
#[derive(Clone, Debug)]
pub struct TransitionDriver<T: Interpolate = f32> {
    from: T,
    to: T,
    duration: Duration,
    elapsed: Duration,
    state: DriverState,
}

impl<T: Interpolate> TransitionDriver<T> {
    /// Create a running driver positioned at `from`
    pub fn new(from: T, to: T, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            state: DriverState::Running,
        }
    }

    /// Total duration of the transition
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time fed to the driver so far, capped at the duration
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    /// Get progress (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return if self.elapsed.is_zero() && self.is_running() {
                0.0
            } else {
                1.0
            };
        }
        let t = self.elapsed.as_nanos() as f64 / self.duration.as_nanos() as f64;
        t.min(1.0) as f32
    }

    /// Current interpolated value
    pub fn value(&self) -> T {
        let progress = self.progress();
        if progress >= 1.0 {
            return self.to.clone();
        }
        self.from.lerp(&self.to, progress)
    }

    /// Advance by `dt`
    ///
    /// Returns `Some` on the call that reaches the end of the transition and
    /// `None` on every other call, including all calls after completion or
    /// cancellation.
    pub fn advance(&mut self, dt: Duration) -> Option<Completion> {
        if !self.is_running() {
            return None;
        }

        let total = self.elapsed.saturating_add(dt);
        if total >= self.duration {
            self.elapsed = self.duration;
            self.state = DriverState::Completed;
            return Some(Completion {
                overshoot: total - self.duration,
            });
        }

        self.elapsed = total;
        None
    }

    /// Stop the transition where it is
    ///
    /// Has no effect once the driver has completed.
    pub fn cancel(&mut self) {
        if self.is_running() {
            tracing::trace!(
                "transition cancelled at {:?} of {:?}",
                self.elapsed,
                self.duration
            );
            self.state = DriverState::Cancelled;
        }
    }
}
