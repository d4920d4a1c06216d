//! X11 click injection via the XTest extension
//!
//! Opens a fresh connection per click, the same way the display is queried
//! elsewhere, so the injector itself holds no state.

use tracing::debug;
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::xproto::{
    ConnectionExt as _, BUTTON_PRESS_EVENT, BUTTON_RELEASE_EVENT, MOTION_NOTIFY_EVENT,
};
use x11rb::protocol::xtest::{self, ConnectionExt as _};
use x11rb::CURRENT_TIME;

use super::InputInjector;
use crate::ClickerError;

const LEFT_BUTTON: u8 = 1;

/// XTest-based injector for X11 sessions
pub struct X11Injector;

impl X11Injector {
    /// Create a new X11 injector
    ///
    /// Fails if the display cannot be reached or lacks the XTest extension.
    pub fn new() -> Result<Self, ClickerError> {
        let (conn, _) = x11rb::connect(None)
            .map_err(|e| ClickerError::InputAccess(format!("Failed to connect to X11: {}", e)))?;

        let xtest_present = conn
            .extension_information(xtest::X11_EXTENSION_NAME)
            .map_err(|e| ClickerError::InputAccess(format!("X11 query failed: {}", e)))?
            .is_some();

        if !xtest_present {
            return Err(ClickerError::InputAccess(
                "X server does not support the XTest extension".to_string(),
            ));
        }

        Ok(Self)
    }
}

/// X11 coordinates are 16-bit; out-of-range values saturate at the edge
fn to_x11_coord(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

fn send_error(e: impl std::fmt::Display) -> ClickerError {
    ClickerError::SendEvent(format!("XTest: {}", e))
}

impl InputInjector for X11Injector {
    fn name(&self) -> &'static str {
        "x11"
    }

    fn inject_click(&self, x: i32, y: i32) -> Result<(), ClickerError> {
        debug!("Sending left-click at ({}, {}) via XTest", x, y);

        let (conn, screen_num) = x11rb::connect(None).map_err(send_error)?;
        let root = conn.setup().roots[screen_num].root;

        let (x, y) = (to_x11_coord(x), to_x11_coord(y));

        conn.xtest_fake_input(MOTION_NOTIFY_EVENT, 0, CURRENT_TIME, root, x, y, 0)
            .map_err(send_error)?;
        conn.xtest_fake_input(BUTTON_PRESS_EVENT, LEFT_BUTTON, CURRENT_TIME, root, 0, 0, 0)
            .map_err(send_error)?;
        conn.xtest_fake_input(BUTTON_RELEASE_EVENT, LEFT_BUTTON, CURRENT_TIME, root, 0, 0, 0)
            .map_err(send_error)?;

        // Round trip so the events are in the server queue before returning
        conn.get_input_focus()
            .map_err(send_error)?
            .reply()
            .map_err(send_error)?;

        debug!("Left-click sent successfully");
        Ok(())
    }
}
