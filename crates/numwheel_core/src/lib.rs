//! numwheel Core
//!
//! Toolkit-independent logic of an animated digit wheel (an odometer or
//! stopwatch display where each digit scrolls up into the next):
//!
//! - **Digit Cells**: displayed value, scroll offset, animating flag
//! - **Wheel Controller**: free-running (carry) and clock-driven (target
//!   digit) transition policies
//! - **Render Surface**: the contract a toolkit implements to paint cells
//! - **Scheduler Adapter**: `NumberWheel`, which drives a controller from
//!   fire-once scheduler ticks
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use numwheel_animation::ManualScheduler;
//! use numwheel_core::{NumberWheel, WheelConfig, WheelController};
//!
//! let config = WheelConfig::builder()
//!     .digits(2)
//!     .cell_duration(Duration::from_millis(1000))
//!     .frame_interval(Duration::from_millis(1000))
//!     .build()
//!     .unwrap();
//!
//! let scheduler = ManualScheduler::new();
//! let wheel = NumberWheel::attach(WheelController::new(config).unwrap(), scheduler.clone());
//! wheel.start();
//!
//! scheduler.advance(Duration::from_secs(10));
//! assert_eq!(wheel.snapshot().reading(), 10);
//! ```

pub mod cell;
pub mod config;
pub mod controller;
pub mod error;
pub mod listener;
pub mod render;
pub mod wheel;

pub use cell::DigitCell;
pub use config::{WheelConfig, WheelConfigBuilder, WheelMode};
pub use controller::{WheelController, WheelSnapshot};
pub use error::{CellFault, ConfigError, Result};
pub use listener::ValueListener;
pub use render::{CellFrame, RenderSurface};
pub use wheel::NumberWheel;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cell::DigitCell;
    pub use crate::config::{WheelConfig, WheelMode};
    pub use crate::controller::{WheelController, WheelSnapshot};
    pub use crate::error::{CellFault, ConfigError};
    pub use crate::listener::ValueListener;
    pub use crate::render::{CellFrame, RenderSurface};
    pub use crate::wheel::NumberWheel;
    pub use numwheel_animation::{ManualScheduler, Scheduler};
}
