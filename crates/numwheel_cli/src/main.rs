//! numwheel CLI
//!
//! Runs a digit wheel in the terminal, either as an odometer-style counter
//! or as a stopwatch. While running, single-letter commands are read from
//! stdin, one per line.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use numwheel_animation::ManualScheduler;
use numwheel_core::{NumberWheel, WheelConfig, WheelController, WheelMode};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod surface;

use surface::TextSurface;

#[derive(Parser)]
#[command(name = "numwheel")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Animated digit wheels in the terminal", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count upward forever, carrying into higher digits
    Counter(RunArgs),

    /// Show elapsed time, each digit following the clock
    Timer(RunArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Number of digit positions
    #[arg(short, long)]
    digits: Option<usize>,

    /// Duration of one digit transition, in milliseconds
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Redraw period, in milliseconds
    #[arg(long)]
    frame_ms: Option<u64>,

    /// Exit after this many milliseconds
    #[arg(long)]
    run_for_ms: Option<u64>,

    /// Draw without the background brackets
    #[arg(long)]
    no_fill: bool,

    /// Settings file (defaults to ./numwheel.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// What the input loop should do after a command
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout belongs to the wheel
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let (mode, args) = match cli.command {
        Commands::Counter(args) => (WheelMode::FreeRunning, args),
        Commands::Timer(args) => (WheelMode::ClockDriven, args),
    };
    let config = config::resolve(&args, mode)?;
    let run_for = args.run_for_ms.map(Duration::from_millis);

    let runtime = build_runtime()?;
    let result = runtime.block_on(run(config, run_for));

    // A pending stdin read would otherwise keep the runtime alive
    runtime.shutdown_background();
    result
}

/// Single-threaded runtime with a timer; stdin reads use the blocking pool
fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start the async runtime")
}

async fn run(config: WheelConfig, run_for: Option<Duration>) -> Result<()> {
    let mode = config.mode;
    info!(
        ?mode,
        digits = config.digits,
        cell_duration = ?config.cell_duration,
        frame_interval = ?config.frame_interval,
        "starting wheel"
    );

    let mut frames = tokio::time::interval(config.frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let tenths = Rc::new(Cell::new(None));
    let scheduler = ManualScheduler::new();
    let wheel = NumberWheel::attach(WheelController::new(config)?, scheduler.clone())
        .with_surface(TextSurface::new(std::io::stdout(), tenths.clone()));

    if mode == WheelMode::ClockDriven {
        wheel.set_listener(move |elapsed: u64| tenths.set(Some(elapsed / 100)));
    }

    info!("commands: p=pause s=stop g=start r=restart f=fill q=quit");
    wheel.start();

    let epoch = Instant::now();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = frames.tick() => {
                scheduler.advance_to(epoch.elapsed());
                if run_for.is_some_and(|limit| epoch.elapsed() >= limit) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line.context("Failed to read stdin")? {
                    Some(line) => {
                        if apply_command(&wheel, line.trim()) == Flow::Quit {
                            break;
                        }
                    }
                    None => stdin_open = false,
                }
            }
        }
    }

    println!();
    info!(reading = wheel.snapshot().reading(), "wheel stopped");
    Ok(())
}

fn apply_command(wheel: &NumberWheel<ManualScheduler>, command: &str) -> Flow {
    match command {
        "p" => {
            let paused = wheel.toggle_pause();
            info!(paused, "pause toggled");
        }
        "s" => wheel.stop(),
        "g" => wheel.start(),
        "r" => wheel.restart(),
        "f" => {
            let filled = !wheel.with_controller(|c| c.is_filled());
            wheel.set_filled(filled);
        }
        "q" => return Flow::Quit,
        "" => {}
        other => warn!("Unknown command '{}'", other),
    }
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use numwheel_animation::Scheduler;

    fn wheel(mode: WheelMode) -> (ManualScheduler, NumberWheel<ManualScheduler>) {
        let config = WheelConfig::builder()
            .digits(2)
            .cell_duration(Duration::from_millis(100))
            .frame_interval(Duration::from_millis(10))
            .mode(mode)
            .build()
            .unwrap();
        let scheduler = ManualScheduler::new();
        let wheel = NumberWheel::attach(WheelController::new(config).unwrap(), scheduler.clone());
        (scheduler, wheel)
    }

    #[test]
    fn test_runtime_drives_frames() {
        let runtime = build_runtime().unwrap();
        let (scheduler, wheel) = wheel(WheelMode::FreeRunning);
        wheel.start();

        runtime.block_on(async {
            let epoch = Instant::now();
            let mut frames = tokio::time::interval(Duration::from_millis(5));
            for _ in 0..3 {
                frames.tick().await;
                scheduler.advance_to(epoch.elapsed());
            }
        });
        runtime.shutdown_background();

        assert!(scheduler.now() >= Duration::from_millis(10));
        assert!(wheel.with_controller(|c| c.is_running()));
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["numwheel", "-v", "timer", "--digits", "4", "--no-fill"])
            .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Timer(args) => {
                assert_eq!(args.digits, Some(4));
                assert!(args.no_fill);
                assert_eq!(args.duration_ms, None);
            }
            Commands::Counter(_) => panic!("expected timer"),
        }

        assert!(Cli::try_parse_from(["numwheel"]).is_err());
    }

    #[test]
    fn test_commands_drive_the_wheel() {
        let (scheduler, wheel) = wheel(WheelMode::ClockDriven);

        assert_eq!(apply_command(&wheel, "g"), Flow::Continue);
        assert!(wheel.with_controller(|c| c.is_running()));

        apply_command(&wheel, "p");
        assert!(wheel.with_controller(|c| c.is_paused()));

        apply_command(&wheel, "f");
        assert!(!wheel.with_controller(|c| c.is_filled()));

        apply_command(&wheel, "s");
        scheduler.advance(Duration::from_millis(50));
        assert!(!wheel.with_controller(|c| c.is_running()));

        assert_eq!(apply_command(&wheel, "bogus"), Flow::Continue);
        assert_eq!(apply_command(&wheel, "q"), Flow::Quit);
    }

    #[test]
    fn test_restart_command_restarts_counter() {
        let (scheduler, wheel) = wheel(WheelMode::FreeRunning);
        apply_command(&wheel, "g");
        apply_command(&wheel, "s");
        scheduler.advance(Duration::from_millis(200));
        assert!(wheel.snapshot().is_settled());

        apply_command(&wheel, "r");
        assert!(!wheel.snapshot().is_settled());
    }
}
