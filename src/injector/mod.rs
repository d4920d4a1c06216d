//! Input injection - one synthetic left-click per platform backend
//!
//! Every backend is stateless and submits a left-button down followed by a
//! left-button up at absolute screen coordinates. No bounds checking is done
//! here; out-of-range coordinates behave however the platform decides.
//!
//! The backend is picked once at startup with [`Backend::detect`] (or forced
//! by the user) and then built with [`create_injector`].

use std::fmt;

use crate::ClickerError;

#[cfg(target_os = "linux")]
mod x11;

#[cfg(target_os = "linux")]
mod ydotool;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "linux")]
pub use x11::X11Injector;

#[cfg(target_os = "linux")]
pub use ydotool::YdotoolInjector;

#[cfg(target_os = "windows")]
pub use windows::WindowsInjector;

#[cfg(target_os = "macos")]
pub use macos::MacOsInjector;

/// Trait for click injection implementations
pub trait InputInjector: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Submit a left-click at absolute screen coordinates
    ///
    /// Failures are best effort: the caller may log the error but the click
    /// is never retried.
    fn inject_click(&self, x: i32, y: i32) -> Result<(), ClickerError>;
}

/// Available injection backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// XTest on an X11 display
    X11,
    /// ydotool (uinput) on Wayland
    Ydotool,
    /// SendInput on Windows
    Windows,
    /// Quartz event services on macOS
    MacOs,
}

impl Backend {
    /// Pick the backend for the host platform
    pub fn detect() -> Result<Self, ClickerError> {
        #[cfg(target_os = "windows")]
        return Ok(Backend::Windows);

        #[cfg(target_os = "macos")]
        return Ok(Backend::MacOs);

        #[cfg(target_os = "linux")]
        return Self::detect_linux(
            std::env::var_os("WAYLAND_DISPLAY").is_some(),
            std::env::var_os("DISPLAY").is_some(),
        );

        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        return Err(ClickerError::Backend(
            "unsupported platform".to_string(),
        ));
    }

    /// Wayland wins over X11 since XTest only reaches XWayland clients there
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    fn detect_linux(wayland: bool, x11: bool) -> Result<Self, ClickerError> {
        if wayland {
            Ok(Backend::Ydotool)
        } else if x11 {
            Ok(Backend::X11)
        } else {
            Err(ClickerError::Backend(
                "no display server detected (neither WAYLAND_DISPLAY nor DISPLAY is set)"
                    .to_string(),
            ))
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::X11 => "x11",
            Backend::Ydotool => "ydotool",
            Backend::Windows => "windows",
            Backend::MacOs => "macos",
        };
        f.write_str(name)
    }
}

/// Build the injector for `backend`
pub fn create_injector(backend: Backend) -> Result<Box<dyn InputInjector>, ClickerError> {
    match backend {
        #[cfg(target_os = "linux")]
        Backend::X11 => Ok(Box::new(X11Injector::new()?)),

        #[cfg(target_os = "linux")]
        Backend::Ydotool => Ok(Box::new(YdotoolInjector::new()?)),

        #[cfg(target_os = "windows")]
        Backend::Windows => Ok(Box::new(WindowsInjector::new())),

        #[cfg(target_os = "macos")]
        Backend::MacOs => Ok(Box::new(MacOsInjector::new()?)),

        #[allow(unreachable_patterns)]
        other => Err(ClickerError::Backend(format!(
            "{} backend is not available on this platform",
            other
        ))),
    }
}
