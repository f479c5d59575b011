//! Wheel controller
//!
//! [`WheelController`] owns every [`DigitCell`] of a wheel together with the
//! transition driver of each in-flight cell, and decides which cells move.
//!
//! Two policies share the same machinery:
//!
//! - **FreeRunning**: cell 0 re-arms its own transition for as long as the
//!   wheel runs. When any cell rolls over from 9 to 0 it starts a one-shot
//!   transition on its left neighbour (carry).
//! - **ClockDriven**: nothing re-arms itself. On each tick every idle cell
//!   whose target digit (derived from elapsed time) differs from its value
//!   starts one single-step transition, faster when it is further behind.
//!
//! The controller never reads a clock. Time comes in through
//! [`tick`](WheelController::tick) (absolute scheduler time) or
//! [`advance`](WheelController::advance) (a bare delta).

use numwheel_animation::TransitionDriver;
use smallvec::SmallVec;
use std::fmt;
use std::time::Duration;

use crate::cell::DigitCell;
use crate::config::{WheelConfig, WheelMode};
use crate::error::{CellFault, ConfigError};
use crate::listener::ValueListener;
use crate::render::{CellFrame, RenderSurface};

/// Wheels up to this many digits keep their cells inline
const INLINE_DIGITS: usize = 8;

/// Milliseconds represented by one step of cell 0 when following the clock
const CLOCK_BASE_DIVISOR: u64 = 100;

/// An in-flight transition
#[derive(Debug)]
struct ActiveTransition {
    driver: TransitionDriver,
    /// Set when the transition began at a known instant and has not been
    /// ticked yet; its first tick measures from here
    started_at: Option<Duration>,
}

/// Owns and animates the cells of one wheel
pub struct WheelController {
    config: WheelConfig,
    cells: SmallVec<[DigitCell; INLINE_DIGITS]>,
    /// Parallel to `cells`; `Some` exactly while the cell is animating
    drivers: SmallVec<[Option<ActiveTransition>; INLINE_DIGITS]>,
    running: bool,
    paused: bool,
    clock_start: Option<Duration>,
    last_tick: Option<Duration>,
    listener: Option<Box<dyn ValueListener>>,
}

impl WheelController {
    /// Create a stopped wheel with every cell at rest on 0
    pub fn new(config: WheelConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let digits = config.digits;
        Ok(Self {
            config,
            cells: std::iter::repeat(DigitCell::new()).take(digits).collect(),
            drivers: (0..digits).map(|_| None).collect(),
            running: false,
            paused: false,
            clock_start: None,
            last_tick: None,
            listener: None,
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn mode(&self) -> WheelMode {
        self.config.mode
    }

    pub fn digit_count(&self) -> usize {
        self.cells.len()
    }

    /// All cells, least significant first
    pub fn cells(&self) -> &[DigitCell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&DigitCell> {
        self.cells.get(index)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_filled(&self) -> bool {
        self.config.filled
    }

    /// True when no cell has a transition in flight
    pub fn is_settled(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_animating())
    }

    /// Duration of the transition in flight on `index`, if any
    pub fn transition_duration(&self, index: usize) -> Option<Duration> {
        self.drivers
            .get(index)
            .and_then(|active| active.as_ref())
            .map(|active| active.driver.duration())
    }

    /// Displayed number, reading cells as decimal digits
    pub fn reading(&self) -> u64 {
        reading_of(&self.cells)
    }

    pub fn snapshot(&self) -> WheelSnapshot {
        WheelSnapshot {
            cells: self.cells.clone(),
            running: self.running,
            paused: self.paused,
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Allow transitions to start
    ///
    /// A free-running wheel kicks off cell 0, measuring that transition from
    /// `now` rather than from the previous tick. A clock-driven wheel records
    /// `now` as its start instant the first time it is started; later starts
    /// keep measuring from that instant.
    pub fn start(&mut self, now: Duration) {
        tracing::debug!(mode = ?self.config.mode, ?now, "wheel started");
        self.running = true;
        self.last_tick.get_or_insert(now);

        match self.config.mode {
            WheelMode::FreeRunning => {
                if let Err(fault) = self.start_driver(0, self.config.cell_duration, Some(now)) {
                    tracing::trace!("start left cell 0 alone: {fault}");
                }
            }
            WheelMode::ClockDriven => {
                self.clock_start.get_or_insert(now);
            }
        }
    }

    /// Stop starting new transitions; in-flight ones still complete
    pub fn stop(&mut self) {
        tracing::debug!("wheel stopped");
        self.running = false;
    }

    pub fn restart(&mut self, now: Duration) {
        self.stop();
        self.start(now);
    }

    /// Flip the paused flag of a clock-driven wheel
    ///
    /// Returns the new state. Free-running wheels cannot pause and always
    /// return `false`.
    pub fn toggle_pause(&mut self) -> bool {
        if self.config.mode != WheelMode::ClockDriven {
            tracing::debug!("pause ignored by a free-running wheel");
            return false;
        }
        self.paused = !self.paused;
        tracing::debug!(paused = self.paused, "wheel pause toggled");
        self.paused
    }

    pub fn set_filled(&mut self, filled: bool) {
        self.config.filled = filled;
    }

    /// Replace the value-changed listener
    pub fn set_listener<L>(&mut self, listener: L)
    where
        L: ValueListener + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    /// Start a full-length transition on `index`
    ///
    /// Out-of-range indices and cells that are already moving are ignored.
    pub fn begin_transition(&mut self, index: usize) {
        if let Err(fault) = self.try_begin_transition(index) {
            tracing::trace!("begin_transition ignored: {fault}");
        }
    }

    /// Like [`begin_transition`](Self::begin_transition), reporting why
    /// nothing happened
    pub fn try_begin_transition(&mut self, index: usize) -> Result<(), CellFault> {
        self.start_driver(index, self.config.cell_duration, None)
    }

    // =========================================================================
    // Time
    // =========================================================================

    /// Process a scheduler tick at absolute time `now`
    ///
    /// Advances in-flight transitions by the time since the previous tick
    /// (or since `start`, for the transition `start` began), then, for a
    /// clock-driven wheel, re-derives the target digits.
    pub fn tick(&mut self, now: Duration) {
        let dt = match self.last_tick {
            Some(last) => now.saturating_sub(last),
            None => Duration::ZERO,
        };
        self.last_tick = Some(self.last_tick.map_or(now, |last| last.max(now)));

        self.advance_cells(dt, Some(now));
        if self.config.mode == WheelMode::ClockDriven {
            self.follow_clock(now);
        }
    }

    /// Feed `dt` to every in-flight transition, cells 0 upward
    ///
    /// A carry raised while walking the cells starts its transition before
    /// the walk reaches the neighbour, so that transition is advanced by the
    /// same `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.advance_cells(dt, None);
    }

    /// Paint the current state
    pub fn render<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        surface.begin_frame(self.config.filled);
        for (index, cell) in self.cells.iter().enumerate() {
            surface.draw_cell(
                index,
                CellFrame {
                    displayed: cell.displayed_value(),
                    preview: cell.preview_value(),
                    offset: cell.offset(),
                    cell_height: self.config.cell_height,
                },
            );
        }
        surface.end_frame();
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn advance_cells(&mut self, dt: Duration, now: Option<Duration>) {
        for index in 0..self.cells.len() {
            let Some(active) = self.drivers[index].as_mut() else {
                continue;
            };
            let step = match (active.started_at.take(), now) {
                (Some(started), Some(now)) => now.saturating_sub(started),
                _ => dt,
            };

            match active.driver.advance(step) {
                Some(done) => self.complete_transition(index, done.overshoot),
                None => {
                    let offset = active.driver.value();
                    self.cells[index].set_offset(offset);
                }
            }
        }
    }

    fn start_driver(
        &mut self,
        index: usize,
        duration: Duration,
        started_at: Option<Duration>,
    ) -> Result<(), CellFault> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(CellFault::InvalidIndex { index, len })?;
        if cell.is_animating() {
            return Err(CellFault::RedundantTransition { index });
        }

        cell.begin();
        self.drivers[index] = Some(ActiveTransition {
            driver: TransitionDriver::new(0.0, self.config.cell_height, duration),
            started_at,
        });
        tracing::trace!(index, from = cell.displayed_value(), ?duration, "transition started");
        Ok(())
    }

    fn complete_transition(&mut self, index: usize, overshoot: Duration) {
        self.drivers[index] = None;
        let cell = &mut self.cells[index];
        cell.roll_forward();
        let value = cell.displayed_value();
        tracing::trace!(index, value, "transition complete");

        if self.config.mode != WheelMode::FreeRunning {
            return;
        }
        if index == 0 && self.running {
            self.begin_transition(0);
            self.carry_overshoot(overshoot);
        }
        if value == 0 {
            // At the most significant cell this is an absorbed InvalidIndex
            self.begin_transition(index + 1);
        }
    }

    /// Credit a freshly re-armed cell 0 with the time its predecessor overran
    ///
    /// Capped below one full duration: one tick completes a cell at most once.
    fn carry_overshoot(&mut self, overshoot: Duration) {
        let Some(active) = self.drivers[0].as_mut() else {
            return;
        };
        let limit = active.driver.duration().saturating_sub(Duration::from_nanos(1));
        let _ = active.driver.advance(overshoot.min(limit));
        let offset = active.driver.value();
        self.cells[0].set_offset(offset);
    }

    fn follow_clock(&mut self, now: Duration) {
        if self.paused || !self.running {
            return;
        }

        let start = *self.clock_start.get_or_insert(now);
        let elapsed_ms = now.saturating_sub(start).as_millis() as u64;
        if let Some(listener) = self.listener.as_mut() {
            listener.update(elapsed_ms);
        }

        let mut divisor = CLOCK_BASE_DIVISOR;
        for index in 0..self.cells.len() {
            let cell = self.cells[index];
            let target = target_digit(elapsed_ms, divisor);
            divisor = divisor.saturating_mul(10);

            if target == cell.displayed_value() || cell.is_animating() {
                continue;
            }
            let duration =
                catch_up_duration(self.config.cell_duration, cell.displayed_value(), target);
            if let Err(fault) = self.start_driver(index, duration, None) {
                tracing::trace!("clock transition skipped: {fault}");
            }
        }
    }
}

impl fmt::Debug for WheelController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WheelController")
            .field("mode", &self.config.mode)
            .field("cells", &self.cells)
            .field("running", &self.running)
            .field("paused", &self.paused)
            .field("clock_start", &self.clock_start)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

/// Point-in-time copy of a wheel's cells
#[derive(Clone, Debug, PartialEq)]
pub struct WheelSnapshot {
    /// Least significant first
    pub cells: SmallVec<[DigitCell; INLINE_DIGITS]>,
    pub running: bool,
    pub paused: bool,
}

impl WheelSnapshot {
    /// Displayed digits, least significant first
    pub fn values(&self) -> Vec<u8> {
        self.cells.iter().map(|cell| cell.displayed_value()).collect()
    }

    pub fn reading(&self) -> u64 {
        reading_of(&self.cells)
    }

    pub fn is_settled(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_animating())
    }
}

fn reading_of(cells: &[DigitCell]) -> u64 {
    cells.iter().rev().fold(0u64, |acc, cell| {
        acc.saturating_mul(10)
            .saturating_add(u64::from(cell.displayed_value()))
    })
}

/// Digit a cell should show: `floor(elapsed / divisor) mod 10`
fn target_digit(elapsed_ms: u64, divisor: u64) -> u8 {
    ((elapsed_ms / divisor) % 10) as u8
}

/// Shorter transitions for cells further behind; a wrap from 9 takes the
/// full duration
fn catch_up_duration(cell_duration: Duration, value: u8, target: u8) -> Duration {
    if target > value {
        cell_duration / u32::from(target - value)
    } else {
        cell_duration
    }
}
