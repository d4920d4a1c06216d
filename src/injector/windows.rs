//! Windows click injection
//!
//! Uses SetCursorPos to place the pointer and a single SendInput batch for
//! the button down/up pair.

use tracing::debug;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEINPUT, MOUSE_EVENT_FLAGS,
};
use windows::Win32::UI::WindowsAndMessaging::{SetCursorPos, SetProcessDPIAware};

use super::InputInjector;
use crate::ClickerError;

/// SendInput-based injector
pub struct WindowsInjector;

impl WindowsInjector {
    pub fn new() -> Self {
        // Physical pixels, so captured and injected coordinates agree on scaled displays
        unsafe {
            let _ = SetProcessDPIAware();
        }
        Self
    }
}

impl Default for WindowsInjector {
    fn default() -> Self {
        Self::new()
    }
}

fn mouse_input(flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

impl InputInjector for WindowsInjector {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn inject_click(&self, x: i32, y: i32) -> Result<(), ClickerError> {
        debug!("Sending left-click at ({}, {}) via SendInput", x, y);

        unsafe { SetCursorPos(x, y) }
            .map_err(|e| ClickerError::SendEvent(format!("SetCursorPos failed: {}", e)))?;

        let inputs = [
            mouse_input(MOUSEEVENTF_LEFTDOWN),
            mouse_input(MOUSEEVENTF_LEFTUP),
        ];
        let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };

        if sent as usize != inputs.len() {
            return Err(ClickerError::SendEvent(format!(
                "SendInput accepted {} of {} events: {}",
                sent,
                inputs.len(),
                windows::core::Error::from_win32()
            )));
        }

        debug!("Left-click sent successfully");
        Ok(())
    }
}
