//! Cancellable deferred callbacks.

use std::time::Duration;

use tokio::task::JoinHandle;

/// A callback scheduled to run once after a fixed delay.
///
/// Dropping the handle cancels the callback, so the owner of the handle
/// decides how long the timer may live.
#[derive(Debug)]
#[must_use = "dropping a ScheduledTask cancels it"]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Run `f` once `delay` has elapsed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn after<F>(delay: Duration, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Cancel the callback if it has not run yet
    pub fn cancel(self) {
        // Drop aborts
    }

    /// Release the handle without cancelling. Used by a callback that is
    /// clearing its own slot while it runs.
    pub fn detach(mut self) {
        self.handle.take();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
