//! Configuration management for Precise Clicker

use std::time::Duration;

use crate::injector::Backend;

/// Configuration for the scheduled click
#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound on how long the scheduler sleeps between clock checks
    pub poll_threshold: Duration,

    /// How far in the past a time of day may be before it rolls over to tomorrow
    pub late_tolerance: Duration,

    /// Cadence of the countdown display loop
    pub display_interval: Duration,

    /// How long to wait for the user to click when capturing a position
    pub capture_timeout: Duration,

    /// Force a specific injection backend instead of detecting one
    pub backend: Option<Backend>,

    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_threshold: Duration::from_millis(1),
            late_tolerance: Duration::ZERO,
            display_interval: Duration::from_millis(50),
            capture_timeout: Duration::from_secs(30),
            backend: None,
            verbose: false,
        }
    }
}

impl Config {
    /// Set the scheduler polling threshold
    pub fn with_poll_threshold(mut self, threshold: Duration) -> Self {
        self.poll_threshold = threshold;
        self
    }

    /// Set the lateness tolerated before a time of day means tomorrow
    pub fn with_late_tolerance(mut self, tolerance: Duration) -> Self {
        self.late_tolerance = tolerance;
        self
    }

    /// Set the capture timeout
    pub fn with_capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout = timeout;
        self
    }

    /// Force an injection backend
    pub fn with_backend(mut self, backend: Option<Backend>) -> Self {
        self.backend = backend;
        self
    }

    /// Enable verbose logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
