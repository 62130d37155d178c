//! Command handlers grouped by concern.

pub(crate) mod documents;
pub(crate) mod query;

use std::rc::Rc;

use anyhow::anyhow;
use docdeck_ui::ViewController;
use docdeck_ui::core::config::ViewConfig;
use docdeck_ui::core::fetch::FetchPhase;
use docdeck_ui::core::notify::TracingNotifier;
use docdeck_ui::core::timer::TokioScheduler;
use tokio::sync::Notify;

use crate::client::{AppContext, CliError, CliResult};

/// Build a controller with the native scheduler and a tracing notifier.
pub(crate) fn new_view(config: ViewConfig) -> ViewController {
    ViewController::new(config, Rc::new(TokioScheduler), Rc::new(TracingNotifier))
}

/// A connected controller plus a wake-up signal fired on every change.
pub(crate) struct Session {
    pub(crate) view: ViewController,
    changed: Rc<Notify>,
}

impl Session {
    /// Connect a controller to the service and wait for the first collection.
    /// Must run inside a `LocalSet`.
    pub(crate) async fn open(ctx: &AppContext, config: ViewConfig) -> CliResult<Self> {
        let view = new_view(config);
        let changed = Rc::new(Notify::new());
        let waker = Rc::clone(&changed);
        view.subscribe(move || waker.notify_one());
        view.connect(Rc::new(ctx.endpoint()));

        let session = Self { view, changed };
        session.settle().await?;
        Ok(session)
    }

    /// Wait for the current fetch chain to reach `Ready` or `Failed`.
    pub(crate) async fn settle(&self) -> CliResult<()> {
        loop {
            let state = self.view.fetch_state();
            match state.phase {
                FetchPhase::Ready => return Ok(()),
                FetchPhase::Failed => {
                    let message = state.error.unwrap_or_default();
                    return Err(CliError::failure(anyhow!(message)));
                }
                FetchPhase::Idle => {
                    return Err(CliError::failure(anyhow!("document fetch was cancelled")));
                }
                FetchPhase::Loading | FetchPhase::TransitioningIn => {
                    self.changed.notified().await;
                }
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.view.unmount();
    }
}
