//! Precise Clicker - fire one synthetic left-click at an exact time of day
//!
//! Captures (or takes) a screen position, waits for the chosen clock time
//! and clicks there. Ctrl+C cancels the pending click.

use chrono::{DateTime, Local};
use clap::{Parser, ValueEnum};
use precise_clicker::{
    arm_click, capture_next_click, create_injector, format_countdown, parse_time_of_day,
    resolve_target_time, Backend, ClickTarget, ClickerError, Config, InputInjector,
    PreciseScheduler,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Auto,
    X11,
    Ydotool,
    Windows,
    Macos,
}

impl BackendArg {
    fn into_backend(self) -> Option<Backend> {
        match self {
            BackendArg::Auto => None,
            BackendArg::X11 => Some(Backend::X11),
            BackendArg::Ydotool => Some(Backend::Ydotool),
            BackendArg::Windows => Some(Backend::Windows),
            BackendArg::Macos => Some(Backend::MacOs),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "precise-clicker", version, about = "Click a screen position at an exact time")]
struct Cli {
    /// Clock time to click at (HH:MM[:SS[.mmm]], local time)
    #[arg(long)]
    at: String,

    /// Screen X coordinate (capture interactively when omitted)
    #[arg(long, requires = "y", allow_negative_numbers = true)]
    x: Option<i32>,

    /// Screen Y coordinate
    #[arg(long, requires = "x", allow_negative_numbers = true)]
    y: Option<i32>,

    /// Injection backend
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,

    /// Longest sleep between clock checks, in milliseconds
    #[arg(long, default_value_t = 1)]
    poll_threshold_ms: u64,

    /// How late a time of day may be before it means tomorrow, in milliseconds
    #[arg(long, default_value_t = 0)]
    late_tolerance_ms: u64,

    /// Seconds to wait for the capture click
    #[arg(long, default_value_t = 30)]
    capture_timeout_secs: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config::default()
            .with_poll_threshold(Duration::from_millis(self.poll_threshold_ms))
            .with_late_tolerance(Duration::from_millis(self.late_tolerance_ms))
            .with_capture_timeout(Duration::from_secs(self.capture_timeout_secs))
            .with_backend(self.backend.into_backend())
            .with_verbose(self.verbose)
    }

    fn click_target(&self) -> Option<ClickTarget> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(ClickTarget::new(x, y)),
            _ => None,
        }
    }
}

fn main() -> Result<(), ClickerError> {
    let cli = Cli::parse();
    let config = cli.config();

    // Initialize logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(if config.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .compact()
        .init();

    info!("Precise Clicker starting...");

    let time_of_day = parse_time_of_day(&cli.at)?;

    // Pick the backend once for the whole run
    let backend = match config.backend {
        Some(backend) => backend,
        None => Backend::detect()?,
    };
    let injector: Arc<dyn InputInjector> = match create_injector(backend) {
        Ok(injector) => Arc::from(injector),
        Err(e) => {
            error!("Cannot use the {} backend: {}", backend, e);
            return Err(e);
        }
    };
    info!("Input backend ready: {}", injector.name());

    // Set up Ctrl+C handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    ctrlc::set_handler(move || {
        info!("Shutdown signal received");
        running_clone.store(false, Ordering::SeqCst);
    })
    .map_err(|e| ClickerError::Signal(e.to_string()))?;

    let target = match cli.click_target() {
        Some(target) => {
            info!("Position given {}", target);
            target
        }
        None => {
            info!("Click anywhere to capture the target position...");
            if backend == Backend::Ydotool {
                info!("Native Wayland windows do not report clicks; pass --x/--y if capture times out");
            }
            match capture_next_click(config.capture_timeout, &running) {
                Ok(target) => target,
                Err(ClickerError::Interrupted) => {
                    info!("Capture canceled, shutting down...");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    };

    let when = resolve_target_time(&Local::now(), time_of_day, config.late_tolerance)?;
    let scheduler = PreciseScheduler::new(config.poll_threshold);
    let (sender, receiver) = mpsc::channel();

    let handle = arm_click(&scheduler, injector, target, SystemTime::from(when), sender)?;
    info!(
        "Click armed for {} at {} (job {})",
        DateTime::<Local>::from(handle.target()).format("%Y-%m-%d %H:%M:%S%.3f"),
        target,
        handle.id()
    );
    info!("Press Ctrl+C to cancel");

    let mut last_shown = None;

    // Main loop: countdown display and outcome reporting
    loop {
        match receiver.recv_timeout(config.display_interval) {
            Ok(outcome) => {
                match &outcome.result {
                    Ok(()) => info!(
                        "Click executed at {} (late by {:?})",
                        DateTime::<Local>::from(outcome.fired_at).format("%H:%M:%S%.3f"),
                        outcome.lateness()
                    ),
                    Err(e) => warn!("Click at {} failed: {}", outcome.target, e),
                }
                break;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if !running.load(Ordering::SeqCst) {
                    if handle.cancel() {
                        info!("Click canceled");
                    }
                    continue;
                }

                if let Some(remaining) = handle.remaining() {
                    let whole_seconds = remaining.as_secs();
                    if last_shown != Some(whole_seconds) {
                        last_shown = Some(whole_seconds);
                        info!("Time remaining {}", format_countdown(remaining));
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    handle.join();
    info!("Precise Clicker shutting down...");

    Ok(())
}
