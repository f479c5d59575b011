//! Core error types

use thiserror::Error;

/// Faults a cell operation can run into
///
/// The controller absorbs both as no-ops; they are only surfaced through
/// [`WheelController::try_begin_transition`](crate::WheelController::try_begin_transition).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFault {
    /// Index outside `[0, len)`
    #[error("cell index {index} out of range for a wheel of {len} digits")]
    InvalidIndex { index: usize, len: usize },

    /// Cell already has a transition in flight
    #[error("cell {index} is already transitioning")]
    RedundantTransition { index: usize },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("digit count must be at least 1, got {0}")]
    InvalidDigitCount(usize),

    #[error("cell duration must be positive")]
    InvalidCellDuration,

    #[error("cell height must be positive and finite, got {0}")]
    InvalidCellHeight(f32),

    #[error("frame interval must be positive")]
    InvalidFrameInterval,

    /// Malformed configuration file
    #[error("failed to parse wheel configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
