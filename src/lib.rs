//! Precise Clicker - fire one synthetic mouse click at an exact wall-clock time
//!
//! This library provides components for:
//! - Precise scheduling (a single cancellable job polled against the clock)
//! - Input injection (one synthetic left-click per platform backend)
//! - Click-position capture (global listener for the next left-click)
//! - Target time resolution (time of day to absolute instant)

pub mod capture;
pub mod click_job;
pub mod config;
pub mod injector;
pub mod scheduler;
pub mod target;

pub use capture::{capture_next_click, ClickTracker};
pub use click_job::{arm_click, ClickOutcome};
pub use config::Config;
pub use injector::{create_injector, Backend, InputInjector};
pub use scheduler::{JobHandle, JobState, PreciseScheduler};
pub use target::{format_countdown, parse_time_of_day, resolve_target_time, ClickTarget};

use thiserror::Error;

/// Main error type for Precise Clicker
#[derive(Error, Debug)]
pub enum ClickerError {
    #[error("Failed to access input backend: {0}")]
    InputAccess(String),

    #[error("Failed to send input event: {0}")]
    SendEvent(String),

    #[error("No usable input backend: {0}")]
    Backend(String),

    #[error("Invalid target time: {0}")]
    InvalidTime(String),

    #[error("Failed to capture click position: {0}")]
    Capture(String),

    #[error("No click captured within {0:?}")]
    CaptureTimeout(std::time::Duration),

    #[error("Interrupted by shutdown signal")]
    Interrupted,

    #[error("Failed to spawn scheduler thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Failed to install signal handler: {0}")]
    Signal(String),
}
