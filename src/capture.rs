//! Click-position capture using rdev
//!
//! Listens globally for the next left-click and reports where it landed.
//! rdev button events carry no coordinates, so the last pointer motion is
//! tracked and paired with the press.
//!
//! On Linux rdev listens through X11, so only X11 and XWayland clients are
//! seen. On a native Wayland desktop the capture never sees a click and
//! times out; pass the coordinates explicitly there.

use rdev::{listen, Button, EventType};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::target::ClickTarget;
use crate::ClickerError;

/// Pairs pointer motion with the first left-button press
#[derive(Debug, Default)]
pub struct ClickTracker {
    last_position: Option<(f64, f64)>,
    captured: bool,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event; yields the target on the first left press with a known position
    pub fn observe(&mut self, event_type: &EventType) -> Option<ClickTarget> {
        if self.captured {
            return None;
        }

        match event_type {
            EventType::MouseMove { x, y } => {
                self.last_position = Some((*x, *y));
                None
            }
            EventType::ButtonPress(Button::Left) => match self.last_position {
                Some((x, y)) => {
                    self.captured = true;
                    Some(ClickTarget::new(x.round() as i32, y.round() as i32))
                }
                None => {
                    debug!("Left click before any pointer motion, position unknown");
                    None
                }
            },
            _ => None,
        }
    }
}

/// How often the capture wait checks for a shutdown request
const SHUTDOWN_CHECK: Duration = Duration::from_millis(100);

/// Wait for the user's next left-click and return its position
///
/// Gives up with `Interrupted` as soon as `running` is cleared. The listener
/// thread cannot be stopped once started; after the capture it keeps
/// running and ignores further events.
pub fn capture_next_click(
    timeout: Duration,
    running: &AtomicBool,
) -> Result<ClickTarget, ClickerError> {
    let (sender, receiver) = mpsc::channel();

    thread::Builder::new()
        .name("click-capture".to_string())
        .spawn(move || {
            info!("Click capture listener started");

            let mut tracker = ClickTracker::new();
            let callback = move |event: rdev::Event| {
                if let Some(target) = tracker.observe(&event.event_type) {
                    if let Err(e) = sender.send(target) {
                        error!("Failed to send captured position: {}", e);
                    }
                }
            };

            if let Err(e) = listen(callback) {
                error!("Error in click capture listener: {:?}", e);
            }
        })?;

    let target = wait_for_click(&receiver, timeout, running)?;
    info!("Position captured {}", target);
    Ok(target)
}

/// Receive the captured target, watching `running` while waiting
fn wait_for_click(
    receiver: &mpsc::Receiver<ClickTarget>,
    timeout: Duration,
    running: &AtomicBool,
) -> Result<ClickTarget, ClickerError> {
    let deadline = Instant::now() + timeout;

    loop {
        if !running.load(Ordering::SeqCst) {
            return Err(ClickerError::Interrupted);
        }

        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(ClickerError::CaptureTimeout(timeout));
        }

        match receiver.recv_timeout(left.min(SHUTDOWN_CHECK)) {
            Ok(target) => return Ok(target),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(ClickerError::Capture(
                    "listener stopped before a click was seen".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_pairs_with_last_motion() {
        let mut tracker = ClickTracker::new();
        assert_eq!(tracker.observe(&EventType::MouseMove { x: 10.0, y: 20.0 }), None);
        assert_eq!(tracker.observe(&EventType::MouseMove { x: 311.6, y: 402.2 }), None);
        assert_eq!(
            tracker.observe(&EventType::ButtonPress(Button::Left)),
            Some(ClickTarget::new(312, 402))
        );
    }

    #[test]
    fn test_only_first_left_click_is_captured() {
        let mut tracker = ClickTracker::new();
        tracker.observe(&EventType::MouseMove { x: 1.0, y: 2.0 });
        assert!(tracker.observe(&EventType::ButtonPress(Button::Left)).is_some());

        tracker.observe(&EventType::MouseMove { x: 50.0, y: 60.0 });
        assert_eq!(tracker.observe(&EventType::ButtonPress(Button::Left)), None);
    }

    #[test]
    fn test_other_buttons_ignored() {
        let mut tracker = ClickTracker::new();
        tracker.observe(&EventType::MouseMove { x: 5.0, y: 5.0 });
        assert_eq!(tracker.observe(&EventType::ButtonPress(Button::Right)), None);
        assert_eq!(tracker.observe(&EventType::ButtonRelease(Button::Left)), None);
        assert_eq!(
            tracker.observe(&EventType::ButtonPress(Button::Left)),
            Some(ClickTarget::new(5, 5))
        );
    }

    #[test]
    fn test_press_without_motion_is_skipped() {
        let mut tracker = ClickTracker::new();
        assert_eq!(tracker.observe(&EventType::ButtonPress(Button::Left)), None);
        tracker.observe(&EventType::MouseMove { x: 7.0, y: 8.0 });
        assert_eq!(
            tracker.observe(&EventType::ButtonPress(Button::Left)),
            Some(ClickTarget::new(7, 8))
        );
    }

    #[test]
    fn test_wait_returns_captured_target() {
        let (sender, receiver) = mpsc::channel();
        let running = AtomicBool::new(true);
        sender.send(ClickTarget::new(30, 40)).unwrap();

        let target = wait_for_click(&receiver, Duration::from_secs(1), &running).unwrap();
        assert_eq!(target, ClickTarget::new(30, 40));
    }

    #[test]
    fn test_wait_stops_on_shutdown() {
        let (_sender, receiver) = mpsc::channel::<ClickTarget>();
        let running = AtomicBool::new(false);

        let started = Instant::now();
        let result = wait_for_click(&receiver, Duration::from_secs(30), &running);
        assert!(matches!(result, Err(ClickerError::Interrupted)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_wait_notices_shutdown_mid_wait() {
        let (_sender, receiver) = mpsc::channel::<ClickTarget>();
        let running = std::sync::Arc::new(AtomicBool::new(true));

        let flag = running.clone();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            flag.store(false, Ordering::SeqCst);
        });

        let started = Instant::now();
        let result = wait_for_click(&receiver, Duration::from_secs(30), &running);
        stopper.join().unwrap();

        assert!(matches!(result, Err(ClickerError::Interrupted)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_wait_times_out() {
        let (_sender, receiver) = mpsc::channel::<ClickTarget>();
        let running = AtomicBool::new(true);

        let result = wait_for_click(&receiver, Duration::from_millis(50), &running);
        assert!(matches!(result, Err(ClickerError::CaptureTimeout(_))));
    }
}
