//! macOS click injection using Quartz event services
//!
//! Requirements:
//! - Accessibility permissions must be granted to the application
//! - System Settings > Privacy & Security > Accessibility

use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use core_graphics::geometry::CGPoint;
use tracing::debug;

use super::InputInjector;
use crate::ClickerError;

/// CGEvent-based injector
pub struct MacOsInjector;

impl MacOsInjector {
    pub fn new() -> Result<Self, ClickerError> {
        event_source().map_err(|_| {
            ClickerError::InputAccess(
                "Cannot create a HID event source. Grant Accessibility permission".to_string(),
            )
        })?;
        Ok(Self)
    }
}

fn event_source() -> Result<CGEventSource, ()> {
    CGEventSource::new(CGEventSourceStateID::HIDSystemState)
}

impl InputInjector for MacOsInjector {
    fn name(&self) -> &'static str {
        "macos"
    }

    fn inject_click(&self, x: i32, y: i32) -> Result<(), ClickerError> {
        debug!("Sending left-click at ({}, {}) via CGEventPost", x, y);

        let point = CGPoint::new(f64::from(x), f64::from(y));
        for (event_type, label) in [
            (CGEventType::LeftMouseDown, "mouse-down"),
            (CGEventType::LeftMouseUp, "mouse-up"),
        ] {
            let source = event_source().map_err(|_| {
                ClickerError::SendEvent("Failed to create event source".to_string())
            })?;
            let event = CGEvent::new_mouse_event(source, event_type, point, CGMouseButton::Left)
                .map_err(|_| {
                    ClickerError::SendEvent(format!("Failed to create {} event", label))
                })?;
            event.post(CGEventTapLocation::HID);
        }

        debug!("Left-click sent successfully");
        Ok(())
    }
}
