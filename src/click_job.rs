//! Wiring between the scheduler and an injector
//!
//! The click is injected on the scheduler thread, right at the target. The
//! outcome is then handed back over a channel so the caller can report it
//! from its own thread.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::warn;

use crate::injector::InputInjector;
use crate::scheduler::{JobHandle, PreciseScheduler};
use crate::target::ClickTarget;
use crate::ClickerError;

/// Result of a fired click, delivered to the caller's thread
#[derive(Debug)]
pub struct ClickOutcome {
    pub target: ClickTarget,
    pub scheduled_for: SystemTime,
    pub fired_at: SystemTime,
    pub result: Result<(), ClickerError>,
}

impl ClickOutcome {
    /// How far past the scheduled instant the injection started
    pub fn lateness(&self) -> Duration {
        self.fired_at
            .duration_since(self.scheduled_for)
            .unwrap_or_default()
    }
}

/// Arm a click at `target` for `when`
///
/// The injection result is not retried; it is sent to `outcomes` as is.
pub fn arm_click(
    scheduler: &PreciseScheduler,
    injector: Arc<dyn InputInjector>,
    target: ClickTarget,
    when: SystemTime,
    outcomes: mpsc::Sender<ClickOutcome>,
) -> Result<JobHandle, ClickerError> {
    scheduler.arm(when, move || {
        let fired_at = SystemTime::now();
        let result = injector.inject_click(target.x, target.y);

        let outcome = ClickOutcome {
            target,
            scheduled_for: when,
            fired_at,
            result,
        };
        if outcomes.send(outcome).is_err() {
            warn!("Click outcome dropped, nobody is listening");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingInjector {
        clicks: Mutex<Vec<ClickTarget>>,
        fail: bool,
    }

    impl InputInjector for RecordingInjector {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn inject_click(&self, x: i32, y: i32) -> Result<(), ClickerError> {
            self.clicks.lock().unwrap().push(ClickTarget::new(x, y));
            if self.fail {
                Err(ClickerError::SendEvent("display went away".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_fired_click_reaches_injector_and_caller() {
        let scheduler = PreciseScheduler::default();
        let injector = Arc::new(RecordingInjector::default());
        let (sender, receiver) = mpsc::channel();
        let when = SystemTime::now() + Duration::from_millis(100);

        let handle = arm_click(
            &scheduler,
            injector.clone(),
            ClickTarget::new(100, 200),
            when,
            sender,
        )
        .unwrap();

        let outcome = receiver.recv_timeout(Duration::from_secs(2)).unwrap();
        handle.join();

        assert!(outcome.result.is_ok());
        assert_eq!(outcome.target, ClickTarget::new(100, 200));
        assert_eq!(outcome.scheduled_for, when);
        assert!(outcome.lateness() < Duration::from_millis(10));
        assert_eq!(*injector.clicks.lock().unwrap(), vec![ClickTarget::new(100, 200)]);
    }

    #[test]
    fn test_injection_failure_is_reported_not_retried() {
        let scheduler = PreciseScheduler::default();
        let injector = Arc::new(RecordingInjector {
            fail: true,
            ..Default::default()
        });
        let (sender, receiver) = mpsc::channel();

        let handle = arm_click(
            &scheduler,
            injector.clone(),
            ClickTarget::new(1, 1),
            SystemTime::now(),
            sender,
        )
        .unwrap();
        handle.join();

        let outcome = receiver.recv().unwrap();
        assert!(matches!(outcome.result, Err(ClickerError::SendEvent(_))));
        assert_eq!(injector.clicks.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_canceled_click_never_injects() {
        let scheduler = PreciseScheduler::default();
        let injector = Arc::new(RecordingInjector::default());
        let (sender, receiver) = mpsc::channel();

        let handle = arm_click(
            &scheduler,
            injector.clone(),
            ClickTarget::new(5, 5),
            SystemTime::now() + Duration::from_millis(200),
            sender,
        )
        .unwrap();
        assert!(handle.cancel());
        handle.join();

        assert!(receiver.recv().is_err());
        assert!(injector.clicks.lock().unwrap().is_empty());
    }
}
