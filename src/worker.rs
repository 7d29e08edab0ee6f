//! Background work on the tokio runtime.
//!
//! Two kinds of task run here: one-shot article fetches and the long-lived
//! path watcher.  Neither touches application state.  Each posts
//! [`AppEvent`]s over an [`mpsc`] channel, and the UI thread applies them to
//! [`crate::app::App`] when it drains the channel on its next tick.  Both
//! functions must be called from within the runtime context.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::article::Article;
use crate::connectivity::{ConnectivityStatus, ReachabilityProbe};
use crate::error::FetchError;
use crate::source::NewsSource;

/// Messages sent from background tasks to the UI thread.
#[derive(Debug)]
pub enum AppEvent {
    /// The single result of one fetch attempt.
    Fetched(Result<Vec<Article>, FetchError>),
    /// The path watcher observed a reachability change.
    Path(ConnectivityStatus),
}

/// Run one fetch and hand its result to the UI thread.
///
/// Exactly one [`AppEvent::Fetched`] is sent per call, unless the receiver
/// is already gone.
pub fn spawn_fetch<S: NewsSource>(source: Arc<S>, tx: mpsc::Sender<AppEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = source.fetch_articles().await;
        if let Err(e) = &result {
            warn!(source = source.name(), error = %e, "fetch failed");
        }
        // If the receiver is gone the UI has exited; nothing to report to.
        let _ = tx.send(AppEvent::Fetched(result));
    })
}

/// Watch reachability and post an [`AppEvent::Path`] whenever it changes.
///
/// The first observation is always posted.  The task ends when the receiver
/// is dropped.
pub fn spawn_path_watcher<P: ReachabilityProbe>(
    probe: P,
    interval: Duration,
    tx: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut last = None;

        loop {
            ticker.tick().await;
            let status = ConnectivityStatus::from_reachable(probe.reachable().await);
            if last == Some(status) {
                continue;
            }
            debug!(?status, "path update");
            if tx.send(AppEvent::Path(status)).is_err() {
                return;
            }
            last = Some(status);
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
