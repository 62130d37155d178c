//! Remote collection fetch with bounded retry and stale-result suppression.
//!
//! # Design
//! - Every call to [`RetryingFetcher::fetch`] starts a new generation and
//!   cancels the previous chain; results carrying an older generation are
//!   discarded even if they slip past cancellation.
//! - Failures never escape: they are folded into [`FetchState`].
//! - Listeners run after internal borrows are released, so they may call back
//!   into the fetcher.

use crate::core::timer::{Scheduler, TaskHandle};
use std::cell::RefCell;
use std::fmt::Display;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Retry envelope for one fetch chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt before giving up.
    pub max_retries: u32,
    /// Delay between a failed attempt and the next one.
    pub retry_delay: Duration,
    /// Delay between data landing and the view settling on [`FetchPhase::Ready`].
    pub transition_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(2_000),
            transition_delay: Duration::from_millis(500),
        }
    }
}

/// Lifecycle of the current fetch chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchPhase {
    /// Nothing requested yet, or the last chain was cancelled before data arrived.
    Idle,
    /// Waiting on the operation or on a retry timer.
    Loading,
    /// Data landed; presentation is fading it in.
    TransitioningIn,
    /// Data is current.
    Ready,
    /// Retries exhausted.
    Failed,
}

/// Observable fetch status consumed by presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchState {
    /// Current phase.
    pub phase: FetchPhase,
    /// User-facing message, set when retries are exhausted.
    pub error: Option<String>,
    /// Retries performed in the current chain.
    pub retry_count: u32,
    /// Generation of the current chain.
    pub generation: u64,
}

impl Default for FetchState {
    fn default() -> Self {
        Self {
            phase: FetchPhase::Idle,
            error: None,
            retry_count: 0,
            generation: 0,
        }
    }
}

/// State plus the most recently fetched data.
#[derive(Debug)]
pub struct FetchSnapshot<T> {
    /// Fetch status.
    pub state: FetchState,
    /// Latest successfully fetched data, if any.
    pub data: Option<Rc<T>>,
}

impl<T> Clone for FetchSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            data: self.data.clone(),
        }
    }
}

type Listener<T> = Rc<dyn Fn(&FetchSnapshot<T>)>;

struct Shared<T> {
    state: FetchState,
    data: Option<Rc<T>>,
    task: Option<TaskHandle>,
    listeners: Vec<Listener<T>>,
}

/// Fetches a collection through an injected operation, retrying on failure.
pub struct RetryingFetcher<T> {
    shared: Rc<RefCell<Shared<T>>>,
    scheduler: Rc<dyn Scheduler>,
    failure_message: Rc<str>,
}

impl<T> Clone for RetryingFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
            scheduler: Rc::clone(&self.scheduler),
            failure_message: Rc::clone(&self.failure_message),
        }
    }
}

impl<T: 'static> RetryingFetcher<T> {
    /// Build an idle fetcher. `failure_message` is surfaced once retries run out.
    #[must_use]
    pub fn new(scheduler: Rc<dyn Scheduler>, failure_message: impl Into<Rc<str>>) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                state: FetchState::default(),
                data: None,
                task: None,
                listeners: Vec::new(),
            })),
            scheduler,
            failure_message: failure_message.into(),
        }
    }

    /// Current status.
    #[must_use]
    pub fn state(&self) -> FetchState {
        self.shared.borrow().state.clone()
    }

    /// Latest successfully fetched data.
    #[must_use]
    pub fn data(&self) -> Option<Rc<T>> {
        self.shared.borrow().data.clone()
    }

    /// Status and data together.
    #[must_use]
    pub fn snapshot(&self) -> FetchSnapshot<T> {
        let shared = self.shared.borrow();
        FetchSnapshot {
            state: shared.state.clone(),
            data: shared.data.clone(),
        }
    }

    /// Register a listener invoked after every state transition.
    pub fn subscribe(&self, listener: impl Fn(&FetchSnapshot<T>) + 'static) {
        self.shared.borrow_mut().listeners.push(Rc::new(listener));
    }

    /// Start a new fetch chain, superseding any chain in flight. Returns the
    /// generation assigned to the chain.
    pub fn fetch<F, Fut, E>(&self, operation: F, policy: RetryPolicy) -> u64
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, E>> + 'static,
        E: Display + 'static,
    {
        let generation = {
            let mut shared = self.shared.borrow_mut();
            if let Some(task) = shared.task.take() {
                task.cancel();
            }
            shared.state.generation += 1;
            shared.state.phase = FetchPhase::Loading;
            shared.state.retry_count = 0;
            shared.state.generation
        };
        debug!(generation, "collection fetch started");
        self.emit();

        let fetcher = self.clone();
        let handle = self.scheduler.spawn(Box::pin(async move {
            fetcher.run_chain(generation, operation, policy).await;
        }));

        let mut shared = self.shared.borrow_mut();
        if shared.state.generation == generation {
            shared.task = Some(handle);
        } else {
            // A listener started a newer chain while we were emitting.
            handle.cancel();
        }
        generation
    }

    /// Abandon the current chain without starting a new one (screen unmount or
    /// endpoint loss). Pending timers are cancelled and late results ignored.
    pub fn cancel(&self) {
        let changed = {
            let mut shared = self.shared.borrow_mut();
            if let Some(task) = shared.task.take() {
                task.cancel();
            }
            shared.state.generation += 1;
            match shared.state.phase {
                FetchPhase::Loading => {
                    shared.state.phase = FetchPhase::Idle;
                    true
                }
                FetchPhase::TransitioningIn => {
                    shared.state.phase = FetchPhase::Ready;
                    shared.state.error = None;
                    shared.state.retry_count = 0;
                    true
                }
                FetchPhase::Idle | FetchPhase::Ready | FetchPhase::Failed => false,
            }
        };
        if changed {
            self.emit();
        }
    }

    async fn run_chain<F, Fut, E>(&self, generation: u64, operation: F, policy: RetryPolicy)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        loop {
            let outcome = operation().await;
            if !self.is_current(generation) {
                debug!(generation, "discarding superseded fetch result");
                return;
            }

            match outcome {
                Ok(data) => {
                    self.apply(|shared| {
                        shared.data = Some(Rc::new(data));
                        shared.state.phase = FetchPhase::TransitioningIn;
                    });
                    self.scheduler.sleep(policy.transition_delay).await;
                    if !self.is_current(generation) {
                        return;
                    }
                    debug!(generation, "collection fetch settled");
                    self.apply(|shared| {
                        shared.state.phase = FetchPhase::Ready;
                        shared.state.error = None;
                        shared.state.retry_count = 0;
                        shared.task = None;
                    });
                    return;
                }
                Err(err) => {
                    let retries = self.shared.borrow().state.retry_count;
                    if retries >= policy.max_retries {
                        error!(
                            generation,
                            attempts = retries + 1,
                            error = %err,
                            "collection fetch failed; retries exhausted"
                        );
                        let message = self.failure_message.to_string();
                        self.apply(|shared| {
                            shared.state.phase = FetchPhase::Failed;
                            shared.state.error = Some(message);
                            shared.task = None;
                        });
                        return;
                    }

                    warn!(
                        generation,
                        attempt = retries + 1,
                        error = %err,
                        "collection fetch failed; retrying"
                    );
                    self.apply(|shared| shared.state.retry_count = retries + 1);
                    self.scheduler.sleep(policy.retry_delay).await;
                    if !self.is_current(generation) {
                        return;
                    }
                }
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.shared.borrow().state.generation == generation
    }

    fn apply(&self, mutate: impl FnOnce(&mut Shared<T>)) {
        mutate(&mut *self.shared.borrow_mut());
        self.emit();
    }

    fn emit(&self) {
        let (snapshot, listeners) = {
            let shared = self.shared.borrow();
            (
                FetchSnapshot {
                    state: shared.state.clone(),
                    data: shared.data.clone(),
                },
                shared.listeners.clone(),
            )
        };
        for listener in &listeners {
            listener(&snapshot);
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::core::timer::TokioScheduler;
    use std::cell::{Cell, RefCell};
    use tokio::task::LocalSet;
    use tokio::time::{Instant, sleep};

    const FAILURE: &str = "Failed to fetch documents. Please try again later.";

    fn fetcher() -> RetryingFetcher<Vec<&'static str>> {
        RetryingFetcher::new(Rc::new(TokioScheduler), FAILURE)
    }

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            ..RetryPolicy::default()
        }
    }

    async fn in_local<F: Future<Output = ()>>(body: F) {
        LocalSet::new().run_until(body).await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn persistent_failure_exhausts_retries() {
        in_local(async {
            for max_retries in 0..=3 {
                let fetcher = fetcher();
                let calls: Rc<RefCell<Vec<Instant>>> = Rc::default();
                let log = Rc::clone(&calls);
                fetcher.fetch(
                    move || {
                        log.borrow_mut().push(Instant::now());
                        async { Err::<Vec<&'static str>, _>("connection refused") }
                    },
                    policy(max_retries),
                );

                sleep(Duration::from_secs(30)).await;

                let calls = calls.borrow();
                assert_eq!(calls.len(), max_retries as usize + 1);
                for pair in calls.windows(2) {
                    assert_eq!(pair[1] - pair[0], Duration::from_millis(2_000));
                }
                let state = fetcher.state();
                assert_eq!(state.phase, FetchPhase::Failed);
                assert_eq!(state.retry_count, max_retries);
                assert_eq!(state.error.as_deref(), Some(FAILURE));
                assert!(fetcher.data().is_none());
            }
        })
        .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn success_on_later_attempt_settles_ready() {
        in_local(async {
            let fetcher = fetcher();
            let calls = Rc::new(Cell::new(0_u32));
            let counter = Rc::clone(&calls);
            fetcher.fetch(
                move || {
                    counter.set(counter.get() + 1);
                    let attempt = counter.get();
                    async move {
                        if attempt < 3 {
                            Err("flaky")
                        } else {
                            Ok(vec!["a", "b"])
                        }
                    }
                },
                policy(3),
            );

            // Two failures (2s each) then success.
            sleep(Duration::from_millis(4_100)).await;
            let state = fetcher.state();
            assert_eq!(state.phase, FetchPhase::TransitioningIn);
            assert_eq!(fetcher.data().as_deref(), Some(&vec!["a", "b"]));

            sleep(Duration::from_millis(500)).await;
            let state = fetcher.state();
            assert_eq!(state.phase, FetchPhase::Ready);
            assert_eq!(state.retry_count, 0);
            assert!(state.error.is_none());

            sleep(Duration::from_secs(30)).await;
            assert_eq!(calls.get(), 3);
        })
        .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn newer_fetch_wins_over_slow_one() {
        in_local(async {
            let fetcher = fetcher();
            fetcher.fetch(
                || async {
                    sleep(Duration::from_secs(5)).await;
                    Ok::<_, &str>(vec!["stale"])
                },
                RetryPolicy::default(),
            );
            tokio::task::yield_now().await;

            let newer = fetcher.fetch(
                || async { Ok::<_, &str>(vec!["fresh"]) },
                RetryPolicy::default(),
            );

            sleep(Duration::from_secs(10)).await;
            let state = fetcher.state();
            assert_eq!(state.generation, newer);
            assert_eq!(state.phase, FetchPhase::Ready);
            assert_eq!(fetcher.data().as_deref(), Some(&vec!["fresh"]));
        })
        .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn superseded_retry_chain_does_not_fail_newer_fetch() {
        in_local(async {
            let fetcher = fetcher();
            fetcher.fetch(|| async { Err::<Vec<&'static str>, _>("down") }, policy(3));
            sleep(Duration::from_secs(1)).await;
            assert_eq!(fetcher.state().retry_count, 1);

            fetcher.fetch(|| async { Ok::<_, &str>(vec!["late"]) }, policy(3));
            assert_eq!(fetcher.state().retry_count, 0);

            // The old chain would have exhausted its retries by now.
            sleep(Duration::from_secs(30)).await;
            let state = fetcher.state();
            assert_eq!(state.phase, FetchPhase::Ready);
            assert!(state.error.is_none());
            assert_eq!(fetcher.data().as_deref(), Some(&vec!["late"]));
        })
        .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn pending_transition_of_superseded_chain_never_settles() {
        in_local(async {
            let fetcher = fetcher();
            fetcher.fetch(|| async { Ok::<_, &str>(vec!["a"]) }, RetryPolicy::default());
            sleep(Duration::from_millis(100)).await;
            assert_eq!(fetcher.state().phase, FetchPhase::TransitioningIn);

            let slow = fetcher.fetch(
                || async {
                    sleep(Duration::from_secs(5)).await;
                    Ok::<_, &str>(vec!["b"])
                },
                RetryPolicy::default(),
            );

            // The first chain's fade-in timer would have fired at 500ms.
            sleep(Duration::from_millis(900)).await;
            let state = fetcher.state();
            assert_eq!(state.phase, FetchPhase::Loading);
            assert_eq!(state.generation, slow);
            assert_eq!(fetcher.data().as_deref(), Some(&vec!["a"]));

            sleep(Duration::from_secs(5)).await;
            let state = fetcher.state();
            assert_eq!(state.phase, FetchPhase::Ready);
            assert_eq!(fetcher.data().as_deref(), Some(&vec!["b"]));
        })
        .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn cancel_returns_loading_chain_to_idle() {
        in_local(async {
            let fetcher = fetcher();
            let calls = Rc::new(Cell::new(0_u32));
            let counter = Rc::clone(&calls);
            fetcher.fetch(
                move || {
                    counter.set(counter.get() + 1);
                    async { Err::<Vec<&'static str>, _>("down") }
                },
                policy(3),
            );
            sleep(Duration::from_millis(100)).await;
            fetcher.cancel();
            assert_eq!(fetcher.state().phase, FetchPhase::Idle);

            sleep(Duration::from_secs(30)).await;
            assert_eq!(calls.get(), 1);
            assert_eq!(fetcher.state().phase, FetchPhase::Idle);
        })
        .await;
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn listeners_observe_each_transition() {
        in_local(async {
            let fetcher = fetcher();
            let phases: Rc<RefCell<Vec<FetchPhase>>> = Rc::default();
            let seen = Rc::clone(&phases);
            fetcher.subscribe(move |snapshot| seen.borrow_mut().push(snapshot.state.phase));

            fetcher.fetch(|| async { Ok::<_, &str>(vec!["a"]) }, RetryPolicy::default());
            sleep(Duration::from_secs(1)).await;

            assert_eq!(
                *phases.borrow(),
                [
                    FetchPhase::Loading,
                    FetchPhase::TransitioningIn,
                    FetchPhase::Ready
                ]
            );
        })
        .await;
    }
}
