//! Wheel configuration
//!
//! Set once at construction. Only the fill flag may change afterwards, via
//! [`WheelController::set_filled`](crate::WheelController::set_filled).
//!
//! Configuration can be built in code:
//!
//! ```
//! use std::time::Duration;
//! use numwheel_core::{WheelConfig, WheelMode};
//!
//! let config = WheelConfig::builder()
//!     .digits(4)
//!     .cell_duration(Duration::from_millis(250))
//!     .mode(WheelMode::ClockDriven)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.digits, 4);
//! ```
//!
//! or loaded from TOML, with durations given in milliseconds:
//!
//! ```toml
//! digits = 3
//! cell_duration_ms = 400
//! cell_height = 48.0
//! filled = false
//! mode = "clock_driven"
//! frame_interval_ms = 16
//! ```

use serde::Deserialize;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// How the wheel decides which cells move
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelMode {
    /// Odometer: the last digit spins forever, carries ripple upward
    #[default]
    FreeRunning,
    /// Stopwatch: each digit follows elapsed time independently
    ClockDriven,
}

/// Wheel configuration
#[derive(Clone, Debug, PartialEq)]
pub struct WheelConfig {
    /// Number of digit positions
    pub digits: usize,
    /// Time for one full digit transition
    pub cell_duration: Duration,
    /// Height of one cell; offsets run from 0 to this value
    pub cell_height: f32,
    /// Whether the surface paints a background
    pub filled: bool,
    pub mode: WheelMode,
    /// Period at which a scheduled wheel re-ticks itself
    pub frame_interval: Duration,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            digits: 1,
            cell_duration: Duration::from_millis(1000),
            cell_height: 100.0,
            filled: true,
            mode: WheelMode::FreeRunning,
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl WheelConfig {
    pub fn builder() -> WheelConfigBuilder {
        WheelConfigBuilder::default()
    }

    /// Parse and validate a TOML document; missing keys take defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: WheelConfigFile = toml::from_str(source)?;
        let config = WheelConfig::from(file);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.digits == 0 {
            return Err(ConfigError::InvalidDigitCount(self.digits));
        }
        if self.cell_duration.is_zero() {
            return Err(ConfigError::InvalidCellDuration);
        }
        if !(self.cell_height.is_finite() && self.cell_height > 0.0) {
            return Err(ConfigError::InvalidCellHeight(self.cell_height));
        }
        if self.frame_interval.is_zero() {
            return Err(ConfigError::InvalidFrameInterval);
        }
        Ok(())
    }
}

/// Builder for [`WheelConfig`]
#[derive(Clone, Debug, Default)]
pub struct WheelConfigBuilder {
    config: WheelConfig,
}

impl WheelConfigBuilder {
    pub fn digits(mut self, digits: usize) -> Self {
        self.config.digits = digits;
        self
    }

    pub fn cell_duration(mut self, duration: Duration) -> Self {
        self.config.cell_duration = duration;
        self
    }

    pub fn cell_height(mut self, height: f32) -> Self {
        self.config.cell_height = height;
        self
    }

    pub fn filled(mut self, filled: bool) -> Self {
        self.config.filled = filled;
        self
    }

    pub fn mode(mut self, mode: WheelMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.config.frame_interval = interval;
        self
    }

    pub fn build(self) -> Result<WheelConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// On-disk shape of the configuration
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct WheelConfigFile {
    digits: usize,
    cell_duration_ms: u64,
    cell_height: f32,
    filled: bool,
    mode: WheelMode,
    frame_interval_ms: u64,
}

impl Default for WheelConfigFile {
    fn default() -> Self {
        let config = WheelConfig::default();
        Self {
            digits: config.digits,
            cell_duration_ms: config.cell_duration.as_millis() as u64,
            cell_height: config.cell_height,
            filled: config.filled,
            mode: config.mode,
            frame_interval_ms: config.frame_interval.as_millis() as u64,
        }
    }
}

impl From<WheelConfigFile> for WheelConfig {
    fn from(file: WheelConfigFile) -> Self {
        Self {
            digits: file.digits,
            cell_duration: Duration::from_millis(file.cell_duration_ms),
            cell_height: file.cell_height,
            filled: file.filled,
            mode: file.mode,
            frame_interval: Duration::from_millis(file.frame_interval_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WheelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.digits, 1);
        assert_eq!(config.cell_duration, Duration::from_millis(1000));
        assert!(config.filled);
        assert_eq!(config.mode, WheelMode::FreeRunning);
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        assert!(matches!(
            WheelConfig::builder().digits(0).build(),
            Err(ConfigError::InvalidDigitCount(0))
        ));
        assert!(matches!(
            WheelConfig::builder().cell_duration(Duration::ZERO).build(),
            Err(ConfigError::InvalidCellDuration)
        ));
        assert!(matches!(
            WheelConfig::builder().cell_height(f32::NAN).build(),
            Err(ConfigError::InvalidCellHeight(_))
        ));
        assert!(matches!(
            WheelConfig::builder().cell_height(-4.0).build(),
            Err(ConfigError::InvalidCellHeight(_))
        ));
        assert!(matches!(
            WheelConfig::builder().frame_interval(Duration::ZERO).build(),
            Err(ConfigError::InvalidFrameInterval)
        ));
    }

    #[test]
    fn test_from_toml() {
        let config = WheelConfig::from_toml_str(
            r#"
            digits = 3
            cell_duration_ms = 400
            mode = "clock_driven"
            filled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.digits, 3);
        assert_eq!(config.cell_duration, Duration::from_millis(400));
        assert_eq!(config.mode, WheelMode::ClockDriven);
        assert!(!config.filled);
        // Unspecified keys keep their defaults
        assert_eq!(config.cell_height, 100.0);
        assert_eq!(config.frame_interval, Duration::from_millis(16));
    }

    #[test]
    fn test_from_toml_empty_document() {
        let config = WheelConfig::from_toml_str("").unwrap();
        assert_eq!(config, WheelConfig::default());
    }

    #[test]
    fn test_from_toml_validates() {
        assert!(matches!(
            WheelConfig::from_toml_str("digits = 0"),
            Err(ConfigError::InvalidDigitCount(0))
        ));
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        assert!(matches!(
            WheelConfig::from_toml_str("colour = \"cyan\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
