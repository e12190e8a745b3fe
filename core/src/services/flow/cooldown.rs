//! Cancelable countdown used to gate resends

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Periodic countdown running on the tokio runtime
///
/// `start` spawns a task that waits one `period` per step and reports the
/// remaining count to its callback until it reaches zero. Starting again
/// replaces the running countdown. The task is aborted on `cancel` and when
/// the timer is dropped, so no periodic work outlives its owner.
pub struct CooldownTimer {
    period: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CooldownTimer {
    /// Create a timer that ticks once per `period`
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: Mutex::new(None),
        }
    }

    /// Start counting down from `seconds`, replacing any running countdown
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&self, seconds: u32, on_tick: F)
    where
        F: Fn(u32) + Send + 'static,
    {
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut remaining = seconds;
            while remaining > 0 {
                tokio::time::sleep(period).await;
                remaining -= 1;
                on_tick(remaining);
            }
        });

        if let Some(previous) = self.lock().replace(task) {
            previous.abort();
        }
    }

    /// Stop the running countdown, if any
    pub fn cancel(&self) {
        if let Some(task) = self.lock().take() {
            task.abort();
        }
    }

    /// Whether a countdown is still running
    pub fn is_running(&self) -> bool {
        self.lock()
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CooldownTimer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Drop for CooldownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
