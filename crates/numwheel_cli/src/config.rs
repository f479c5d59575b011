//! Wheel settings for the CLI
//!
//! The base settings come from a TOML file (`--config`, or `numwheel.toml`
//! in the working directory) when there is one, otherwise from built-in
//! defaults for the chosen subcommand. Keys missing from the file take the
//! library defaults. Command-line flags are applied on top, and the
//! subcommand always decides the mode.

use anyhow::{Context, Result};
use numwheel_core::{WheelConfig, WheelMode};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::RunArgs;

const DEFAULT_CONFIG_FILE: &str = "numwheel.toml";

/// Build the wheel configuration for one run
pub fn resolve(args: &RunArgs, mode: WheelMode) -> Result<WheelConfig> {
    let mut config = match &args.config {
        Some(path) => load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => load(Path::new(DEFAULT_CONFIG_FILE))?,
        None => defaults_for(mode),
    };

    if let Some(digits) = args.digits {
        config.digits = digits;
    }
    if let Some(ms) = args.duration_ms {
        config.cell_duration = Duration::from_millis(ms);
    }
    if let Some(ms) = args.frame_ms {
        config.frame_interval = Duration::from_millis(ms);
    }
    if args.no_fill {
        config.filled = false;
    }
    config.mode = mode;

    config.validate().context("Invalid wheel settings")?;
    Ok(config)
}

/// Load settings from a TOML file
pub fn load(path: &Path) -> Result<WheelConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = WheelConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    tracing::debug!("loaded settings from {}", path.display());
    Ok(config)
}

fn defaults_for(mode: WheelMode) -> WheelConfig {
    match mode {
        WheelMode::FreeRunning => WheelConfig {
            digits: 3,
            cell_duration: Duration::from_millis(400),
            ..WheelConfig::default()
        },
        // Cell 0 moves every 100ms, so each step has to be quicker than that
        WheelMode::ClockDriven => WheelConfig {
            digits: 4,
            cell_duration: Duration::from_millis(80),
            ..WheelConfig::default()
        },
    }
}
