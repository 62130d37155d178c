//! [`Scheduler`] on the browser event loop.

use crate::core::timer::Scheduler;
use futures_util::future::LocalBoxFuture;
use std::time::Duration;

/// Spawns onto the JS microtask queue and sleeps with `setTimeout`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(gloo_timers::future::sleep(duration))
    }
}
