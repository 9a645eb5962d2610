//! One-shot cancellable timers for the auto-off cycle.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Handle to a scheduled action. Dropping the handle does **not** cancel the
/// timer; call [`cancel`](Self::cancel).
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Cancel the timer. Idempotent; a no-op once the action has run.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the action has run (or the timer was cancelled).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Run `action` once after `delay`.
pub fn schedule<F>(delay: Duration, action: F) -> TimerHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        action.await;
    });
    TimerHandle { task }
}
