use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Trailing debounce: every call within the window replaces the pending one, only the last
/// scheduled task runs once the window has passed without further calls.
#[derive(Clone)]
pub struct Debouncer {
    wait: Duration,
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self { wait, pending: Arc::new(Mutex::new(None)) }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Schedules `task` after the wait, aborting whatever was scheduled before.
    /// Must be called from within a Tokio runtime.
    pub fn call<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let wait = self.wait;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            // Detached: a later call only replaces the timer, never a task already running.
            tokio::spawn(task);
        });
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(prev) = pending.replace(handle) {
            prev.abort();
        }
    }

    /// Drops the pending task, if any.
    pub fn cancel(&self) {
        if let Some(prev) = self.pending.lock().unwrap_or_else(|e| e.into_inner()).take() {
            prev.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}
