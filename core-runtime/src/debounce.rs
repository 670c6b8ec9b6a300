//! # Single-Slot Delayed Tasks
//!
//! Models the "at most one pending timer of this kind" pattern used by the
//! search debounce: scheduling a new task cancels the previous one. The task
//! body runs on the tokio runtime after the delay elapses, unless superseded
//! or cancelled first.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;

/// A single-slot delayed task scheduler with cancel-and-replace semantics.
#[derive(Clone, Default)]
pub struct Debouncer {
    pending: Arc<Mutex<Option<AbortHandle>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to run after `delay`, cancelling any pending task.
    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        let previous = self.pending.lock().replace(handle.abort_handle());
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Cancels the pending task, if any.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }

    /// Returns `true` if a task is scheduled and has not been aborted.
    ///
    /// A task that already ran still counts as pending until superseded or
    /// cancelled; callers needing exact liveness should track it themselves.
    pub fn is_scheduled(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}
