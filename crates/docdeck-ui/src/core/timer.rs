//! Cancellable task and timer abstraction.
//!
//! # Design
//! - The core never talks to a runtime directly; it receives a [`Scheduler`].
//! - Every spawned task is wrapped in an abort registration so callers can
//!   drop retry chains and pending timers when a newer fetch supersedes them.
//! - Everything is single-threaded: futures are `!Send` and run on the
//!   browser event loop (wasm) or a tokio `LocalSet` (native).

use futures_util::future::{AbortHandle, Abortable, LocalBoxFuture};
use std::time::Duration;

/// Runtime hooks required by the view-state core.
pub trait Scheduler {
    /// Run `task` on the current thread's event loop.
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);

    /// Future that resolves after `duration`.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;

    /// Spawn `task` and return a handle that can cancel it.
    #[must_use]
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) -> TaskHandle {
        let (handle, registration) = AbortHandle::new_pair();
        let task = Abortable::new(task, registration);
        self.spawn_local(Box::pin(async move {
            // An aborted task simply stops; nothing to report.
            let _ = task.await;
        }));
        TaskHandle { handle }
    }
}

/// Handle to a spawned task or pending timer.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    handle: AbortHandle,
}

impl TaskHandle {
    /// Stop the task at its next suspension point. Idempotent.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

/// [`Scheduler`] backed by tokio. Tasks must be spawned from inside a
/// [`tokio::task::LocalSet`].
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioScheduler;

#[cfg(not(target_arch = "wasm32"))]
impl Scheduler for TokioScheduler {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        drop(tokio::task::spawn_local(task));
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tokio::task::LocalSet;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn cancelled_task_never_completes() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let scheduler = TokioScheduler;
                let fired = Rc::new(Cell::new(false));
                let flag = Rc::clone(&fired);
                let sleep = scheduler.sleep(Duration::from_secs(1));
                let handle = scheduler.spawn(Box::pin(async move {
                    sleep.await;
                    flag.set(true);
                }));

                handle.cancel();
                handle.cancel();
                tokio::time::sleep(Duration::from_secs(5)).await;
                assert!(!fired.get());
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn spawned_task_runs_after_delay() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let scheduler = TokioScheduler;
                let fired = Rc::new(Cell::new(false));
                let flag = Rc::clone(&fired);
                let sleep = scheduler.sleep(Duration::from_millis(500));
                let _handle = scheduler.spawn(Box::pin(async move {
                    sleep.await;
                    flag.set(true);
                }));

                tokio::time::sleep(Duration::from_millis(400)).await;
                assert!(!fired.get());
                tokio::time::sleep(Duration::from_millis(200)).await;
                assert!(fired.get());
            })
            .await;
    }
}
