//! Click injection using ydotool
//!
//! Uses ydotool to send mouse events via uinput at the kernel level.
//! Works on Wayland by bypassing the display server entirely.
//! Requires ydotoold daemon to be running: sudo systemctl enable --now ydotoold

use std::process::Command;
use tracing::{debug, info};

use super::InputInjector;
use crate::ClickerError;

/// ydotool button code for left press + release
const LEFT_CLICK: &str = "0xC0";

/// Get the ydotool socket path
fn socket_path() -> String {
    if let Ok(path) = std::env::var("YDOTOOL_SOCKET") {
        return path;
    }
    let uid = unsafe { libc::getuid() };
    format!("/run/user/{}/.ydotool_socket", uid)
}

/// Injector that sends synthetic clicks via ydotool
pub struct YdotoolInjector;

impl YdotoolInjector {
    /// Create a new YdotoolInjector
    ///
    /// Requires ydotool to be installed and ydotoold daemon running.
    pub fn new() -> Result<Self, ClickerError> {
        let output = Command::new("which")
            .arg("ydotool")
            .output()
            .map_err(|e| ClickerError::InputAccess(format!("Failed to check for ydotool: {}", e)))?;

        if !output.status.success() {
            return Err(ClickerError::InputAccess(
                "ydotool not found. Install it from your distribution's packages".to_string(),
            ));
        }

        let socket = socket_path();
        if !std::path::Path::new(&socket).exists() {
            return Err(ClickerError::InputAccess(format!(
                "ydotoold socket {} missing. Start it: sudo systemctl enable --now ydotoold",
                socket
            )));
        }

        info!("Using ydotool via {}", socket);
        Ok(Self)
    }

    /// Run a ydotool command against the daemon socket
    fn run_ydotool(&self, args: &[&str]) -> Result<(), ClickerError> {
        let output = Command::new("ydotool")
            .env("YDOTOOL_SOCKET", socket_path())
            .args(args)
            .output()
            .map_err(|e| ClickerError::SendEvent(format!("Failed to run ydotool: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClickerError::SendEvent(format!("ydotool failed: {}", stderr.trim())));
        }

        Ok(())
    }
}

impl InputInjector for YdotoolInjector {
    fn name(&self) -> &'static str {
        "ydotool"
    }

    fn inject_click(&self, x: i32, y: i32) -> Result<(), ClickerError> {
        debug!("Sending left-click at ({}, {}) via ydotool", x, y);
        let (x, y) = (x.to_string(), y.to_string());
        self.run_ydotool(&["mousemove", "--absolute", "-x", &x, "-y", &y])?;
        self.run_ydotool(&["click", LEFT_CLICK])?;
        debug!("Left-click sent successfully");
        Ok(())
    }
}
