//! numwheel Animation System
//!
//! Deterministic building blocks for digit-wheel animation.
//!
//! # Features
//!
//! - **Transition Drivers**: Linear value transitions fed by elapsed-time deltas
//! - **Interpolation**: `Interpolate` trait for animatable values
//! - **Tick Scheduling**: Fire-once `Scheduler` contract with a virtual-time
//!   `ManualScheduler` for tests and host-driven loops

pub mod driver;
pub mod scheduler;
pub mod values;

pub use driver::{Completion, DriverState, TransitionDriver};
pub use scheduler::{ManualScheduler, Scheduler, TickCallback, TickCallbackId};
pub use values::Interpolate;
