//! Scheduler adapter
//!
//! [`NumberWheel`] binds a [`WheelController`] to a [`Scheduler`]: it
//! schedules a tick every frame interval, forwards each tick to the
//! controller, repaints the attached surface, and re-schedules itself.
//!
//! Everything runs on the scheduler's thread. Controller state is shared
//! with the pending tick callback through `Rc<RefCell<_>>`; the callback
//! only holds a `Weak`, so dropping the wheel ends the loop.
//!
//! Listeners and surfaces are called while the wheel is borrowed and must
//! not call back into the same wheel.

use numwheel_animation::{Scheduler, TickCallbackId};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::controller::{WheelController, WheelSnapshot};
use crate::listener::ValueListener;
use crate::render::RenderSurface;

struct WheelState {
    controller: WheelController,
    surface: Option<Box<dyn RenderSurface>>,
    pending: Option<TickCallbackId>,
}

impl WheelState {
    fn on_frame(&mut self, now: std::time::Duration) {
        self.controller.tick(now);
        if let Some(surface) = self.surface.as_mut() {
            self.controller.render(surface.as_mut());
        }
    }
}

/// A wheel that animates itself from scheduler ticks
pub struct NumberWheel<S: Scheduler + Clone + 'static> {
    state: Rc<RefCell<WheelState>>,
    scheduler: S,
}

impl<S: Scheduler + Clone + 'static> NumberWheel<S> {
    /// Take ownership of `controller` and schedule its first frame
    pub fn attach(controller: WheelController, scheduler: S) -> Self {
        tracing::debug!(
            digits = controller.digit_count(),
            mode = ?controller.mode(),
            "attaching wheel to scheduler"
        );
        let state = Rc::new(RefCell::new(WheelState {
            controller,
            surface: None,
            pending: None,
        }));
        schedule_frame(&state, &scheduler);
        Self { state, scheduler }
    }

    /// Builder-style [`set_surface`](Self::set_surface)
    pub fn with_surface<R: RenderSurface + 'static>(self, surface: R) -> Self {
        self.set_surface(surface);
        self
    }

    /// Paint every frame to `surface`, replacing any previous one
    pub fn set_surface<R: RenderSurface + 'static>(&self, surface: R) {
        self.state.borrow_mut().surface = Some(Box::new(surface));
    }

    pub fn start(&self) {
        let now = self.scheduler.now();
        self.state.borrow_mut().controller.start(now);
    }

    pub fn stop(&self) {
        self.state.borrow_mut().controller.stop();
    }

    pub fn restart(&self) {
        let now = self.scheduler.now();
        self.state.borrow_mut().controller.restart(now);
    }

    /// See [`WheelController::toggle_pause`]
    pub fn toggle_pause(&self) -> bool {
        self.state.borrow_mut().controller.toggle_pause()
    }

    pub fn set_filled(&self, filled: bool) {
        self.state.borrow_mut().controller.set_filled(filled);
    }

    pub fn set_listener<L: ValueListener + 'static>(&self, listener: L) {
        self.state.borrow_mut().controller.set_listener(listener);
    }

    pub fn snapshot(&self) -> WheelSnapshot {
        self.state.borrow().controller.snapshot()
    }

    /// Read-only access to the controller
    pub fn with_controller<R>(&self, f: impl FnOnce(&WheelController) -> R) -> R {
        f(&self.state.borrow().controller)
    }

    /// Whether a frame is currently scheduled
    pub fn is_attached(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Cancel the pending frame and hand the controller back
    ///
    /// Returns `None` if the state is still shared, which only happens when
    /// called from inside one of the wheel's own callbacks.
    pub fn detach(self) -> Option<WheelController> {
        self.cancel_pending();
        let state = Rc::clone(&self.state);
        drop(self);
        Rc::try_unwrap(state)
            .ok()
            .map(|cell| cell.into_inner().controller)
    }

    fn cancel_pending(&self) {
        let pending = match self.state.try_borrow_mut() {
            Ok(mut state) => state.pending.take(),
            Err(_) => None,
        };
        if let Some(id) = pending {
            self.scheduler.cancel_tick(id);
            tracing::debug!("wheel detached from scheduler");
        }
    }
}

impl<S: Scheduler + Clone + 'static> Drop for NumberWheel<S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl<S: Scheduler + Clone + 'static> fmt::Debug for NumberWheel<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_borrow() {
            Ok(state) => f
                .debug_struct("NumberWheel")
                .field("controller", &state.controller)
                .field("attached", &state.pending.is_some())
                .finish(),
            Err(_) => f.debug_struct("NumberWheel").finish_non_exhaustive(),
        }
    }
}

fn schedule_frame<S: Scheduler + Clone + 'static>(state: &Rc<RefCell<WheelState>>, scheduler: &S) {
    let interval = state.borrow().controller.config().frame_interval;
    let weak: Weak<RefCell<WheelState>> = Rc::downgrade(state);
    let next = scheduler.clone();

    let id = scheduler.schedule_tick(
        interval,
        Box::new(move |now| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            {
                let mut guard = state.borrow_mut();
                guard.pending = None;
                guard.on_frame(now);
            }
            schedule_frame(&state, &next);
        }),
    );
    state.borrow_mut().pending = Some(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{WheelConfig, WheelMode};
    use crate::render::CellFrame;
    use numwheel_animation::ManualScheduler;
    use std::time::Duration;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn controller(mode: WheelMode) -> WheelController {
        WheelController::new(
            WheelConfig::builder()
                .digits(2)
                .cell_duration(ms(100))
                .frame_interval(ms(10))
                .mode(mode)
                .build()
                .unwrap(),
        )
        .unwrap()
    }

    struct CountingSurface(Rc<RefCell<usize>>);

    impl RenderSurface for CountingSurface {
        fn draw_cell(&mut self, _index: usize, _frame: CellFrame) {}

        fn end_frame(&mut self) {
            *self.0.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_reschedules_every_frame() {
        let scheduler = ManualScheduler::new();
        let frames = Rc::new(RefCell::new(0));
        let wheel = NumberWheel::attach(controller(WheelMode::FreeRunning), scheduler.clone())
            .with_surface(CountingSurface(frames.clone()));

        assert!(wheel.is_attached());
        scheduler.advance(ms(100));
        assert_eq!(*frames.borrow(), 10);
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn test_commands_reach_controller() {
        let scheduler = ManualScheduler::new();
        let wheel = NumberWheel::attach(controller(WheelMode::FreeRunning), scheduler.clone());

        wheel.start();
        scheduler.advance(ms(250));
        assert_eq!(wheel.snapshot().values(), vec![2, 0]);
        assert!(wheel.with_controller(|c| c.is_running()));

        wheel.stop();
        scheduler.advance(ms(500));
        assert_eq!(wheel.snapshot().values(), vec![3, 0]);
        assert!(wheel.snapshot().is_settled());

        wheel.set_filled(false);
        assert!(!wheel.with_controller(|c| c.is_filled()));
    }

    #[test]
    fn test_drop_cancels_pending_frame() {
        let scheduler = ManualScheduler::new();
        let wheel = NumberWheel::attach(controller(WheelMode::FreeRunning), scheduler.clone());
        assert_eq!(scheduler.pending_count(), 1);

        drop(wheel);
        assert_eq!(scheduler.pending_count(), 0);
        scheduler.advance(ms(100));
    }

    #[test]
    fn test_detach_returns_controller() {
        let scheduler = ManualScheduler::new();
        let wheel = NumberWheel::attach(controller(WheelMode::ClockDriven), scheduler.clone());
        wheel.start();
        scheduler.advance(ms(250));

        let controller = wheel.detach().expect("not shared");
        assert_eq!(controller.cell(0).map(|c| c.displayed_value()), Some(1));
        assert_eq!(scheduler.pending_count(), 0);
    }
}
