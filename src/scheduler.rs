//! Precise single-job scheduler
//!
//! A dedicated thread polls the wall clock against the target instant and
//! sleeps at most `poll_threshold` between checks, so the callback fires
//! within roughly one threshold of the target without busy-spinning.
//!
//! The job state is a single atomic that only ever leaves `Pending` through
//! a compare-and-swap, so fire and cancel cannot both win.
//!
//! The clock is `SystemTime`. A backward clock jump delays the fire and a
//! forward jump fires early relative to the old wall clock; neither is
//! corrected.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

use crate::ClickerError;

const PENDING: u8 = 0;
const CANCELED: u8 = 1;
const FIRED: u8 = 2;

/// Lifecycle of a scheduled job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Canceled,
    Fired,
}

impl JobState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            PENDING => JobState::Pending,
            CANCELED => JobState::Canceled,
            _ => JobState::Fired,
        }
    }
}

/// State shared between the scheduler, the handle and the worker thread
#[derive(Debug)]
struct ScheduledJob {
    id: u64,
    target: SystemTime,
    state: AtomicU8,
}

impl ScheduledJob {
    fn new(id: u64, target: SystemTime) -> Self {
        Self {
            id,
            target,
            state: AtomicU8::new(PENDING),
        }
    }

    fn state(&self) -> JobState {
        JobState::from_raw(self.state.load(Ordering::SeqCst))
    }

    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(PENDING, to, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn try_cancel(&self) -> bool {
        self.transition(CANCELED)
    }

    fn try_fire(&self) -> bool {
        self.transition(FIRED)
    }

    fn remaining(&self) -> Option<Duration> {
        if self.state() != JobState::Pending {
            return None;
        }
        Some(
            self.target
                .duration_since(SystemTime::now())
                .unwrap_or(Duration::ZERO),
        )
    }
}

type ActiveSlot = Mutex<Option<Arc<ScheduledJob>>>;

fn lock(slot: &ActiveSlot) -> MutexGuard<'_, Option<Arc<ScheduledJob>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drop the job from the active slot, unless a newer job already replaced it
fn release(slot: &ActiveSlot, id: u64) {
    let mut active = lock(slot);
    if active.as_ref().is_some_and(|job| job.id == id) {
        *active = None;
    }
}

/// Handle to an armed job
///
/// Dropping the handle does not cancel the job.
pub struct JobHandle {
    job: Arc<ScheduledJob>,
    slot: Arc<ActiveSlot>,
    worker: Option<thread::JoinHandle<()>>,
}

impl JobHandle {
    pub fn id(&self) -> u64 {
        self.job.id
    }

    /// The instant this job fires at
    pub fn target(&self) -> SystemTime {
        self.job.target
    }

    pub fn state(&self) -> JobState {
        self.job.state()
    }

    pub fn is_pending(&self) -> bool {
        self.state() == JobState::Pending
    }

    /// Time left until the target, clamped to zero
    ///
    /// Returns `None` once the job has fired or been canceled.
    pub fn remaining(&self) -> Option<Duration> {
        self.job.remaining()
    }

    /// Cancel the job if it is still pending
    ///
    /// Returns `true` if this call performed the cancellation. Once it
    /// returns `true` the callback is guaranteed never to run.
    pub fn cancel(&self) -> bool {
        if self.job.try_cancel() {
            info!("Job {} canceled", self.job.id);
            release(&self.slot, self.job.id);
            true
        } else {
            debug!("Job {} already {:?}, cancel ignored", self.job.id, self.state());
            false
        }
    }

    /// Block until the worker thread has terminated
    pub fn join(mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Job {} callback panicked", self.job.id);
            }
        }
    }
}

/// Scheduler owning at most one pending job
pub struct PreciseScheduler {
    poll_threshold: Duration,
    active: Arc<ActiveSlot>,
    next_id: AtomicU64,
}

impl PreciseScheduler {
    /// Create a scheduler that sleeps at most `poll_threshold` between clock checks
    pub fn new(poll_threshold: Duration) -> Self {
        Self {
            poll_threshold,
            active: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Arm a job that runs `on_fire` once `target` is reached
    ///
    /// A job that is still pending is canceled first. A target already in
    /// the past fires on the worker's first check.
    pub fn arm<F>(&self, target: SystemTime, on_fire: F) -> Result<JobHandle, ClickerError>
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let job = Arc::new(ScheduledJob::new(id, target));

        {
            let mut active = lock(&self.active);
            if let Some(previous) = active.take() {
                if previous.try_cancel() {
                    info!("Job {} superseded by job {}", previous.id, id);
                }
            }
            *active = Some(Arc::clone(&job));
        }

        let worker_job = Arc::clone(&job);
        let worker_slot = Arc::clone(&self.active);
        let threshold = self.poll_threshold;

        let worker = thread::Builder::new()
            .name("click-scheduler".to_string())
            .spawn(move || {
                run_job(&worker_job, threshold, on_fire);
                release(&worker_slot, worker_job.id);
            });

        let worker = match worker {
            Ok(worker) => worker,
            Err(e) => {
                job.try_cancel();
                release(&self.active, id);
                return Err(ClickerError::Spawn(e));
            }
        };

        debug!("Job {} armed ({:?} ahead)", id, job.remaining().unwrap_or_default());

        Ok(JobHandle {
            job,
            slot: Arc::clone(&self.active),
            worker: Some(worker),
        })
    }

    /// Time left on `handle`'s job, or `None` if it is no longer pending
    pub fn remaining(&self, handle: &JobHandle) -> Option<Duration> {
        handle.remaining()
    }

    /// Cancel `handle`'s job; a no-op if it already fired or was canceled
    pub fn cancel(&self, handle: &JobHandle) -> bool {
        handle.cancel()
    }

    /// Time left on whichever job is currently active
    pub fn remaining_active(&self) -> Option<Duration> {
        lock(&self.active).as_ref().and_then(|job| job.remaining())
    }

    /// Cancel whichever job is currently active
    pub fn cancel_active(&self) -> bool {
        let mut active = lock(&self.active);
        match active.take() {
            Some(job) if job.try_cancel() => {
                info!("Job {} canceled", job.id);
                true
            }
            _ => false,
        }
    }

    pub fn has_active_job(&self) -> bool {
        lock(&self.active)
            .as_ref()
            .is_some_and(|job| job.state() == JobState::Pending)
    }
}

impl Default for PreciseScheduler {
    fn default() -> Self {
        Self::new(Duration::from_millis(1))
    }
}

/// Worker loop: poll until the target is reached or the job is canceled
fn run_job<F: FnOnce()>(job: &ScheduledJob, threshold: Duration, on_fire: F) {
    loop {
        if job.state() != JobState::Pending {
            debug!("Job {} observed cancel, worker exiting", job.id);
            return;
        }

        let now = SystemTime::now();
        match job.target.duration_since(now) {
            Ok(gap) if !gap.is_zero() => thread::sleep(gap.min(threshold)),
            _ => {
                if job.try_fire() {
                    let lateness = now.duration_since(job.target).unwrap_or_default();
                    info!("Job {} fired (late by {:?})", job.id, lateness);
                    on_fire();
                }
                return;
            }
        }
    }
}
