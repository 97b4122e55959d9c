use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const REFRESH_DELAY: Duration = Duration::from_millis(150);

/// Trailing debounce: each `schedule` restarts the delay, and only the most
/// recently scheduled job runs once the delay elapses without another call.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn schedule<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so a later schedule() only cancels the wait, never a running job.
            tokio::spawn(job);
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(timer);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(pending) = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take() {
            pending.abort();
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(REFRESH_DELAY)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
