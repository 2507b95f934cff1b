// Background refresh timer: one refresh at startup, then one per interval.
// The deadline is read from the aggregator, so a manual refresh restarts the countdown.

use crate::aggregator::StatusAggregator;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Owns the refresh task. Dropping it aborts the task; `shutdown` stops it and waits.
pub struct RefreshScheduler {
    handle: Option<JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl RefreshScheduler {
    pub fn spawn(aggregator: Arc<StatusAggregator>) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let interval_secs = aggregator.interval().as_secs();
        let span = tracing::span!(tracing::Level::DEBUG, "scheduler", interval_secs);
        let handle = tokio::spawn(
            async move {
                tokio::select! {
                    _ = run(aggregator) => {}
                    _ = shutdown_rx => {
                        tracing::debug!("Scheduler shutting down");
                    }
                }
            }
            .instrument(span),
        );
        Self {
            handle: Some(handle),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Stops the timer. An in-flight refresh is dropped without touching the snapshot,
    /// and the loading flag goes back to its value from before that refresh.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run(aggregator: Arc<StatusAggregator>) {
    let mut next_rx = aggregator.subscribe_next_refresh();
    aggregator.refresh().await;
    loop {
        let deadline = *next_rx.borrow_and_update();
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => {
                tracing::debug!(operation = "scheduled_refresh", "Refresh timer fired");
                aggregator.refresh().await;
            }
            changed = next_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
