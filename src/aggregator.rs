// Status aggregation: fetch every configured page, join, then apply one snapshot update.

use crate::config::RefreshMode;
use crate::models::{RefreshSummary, ServiceStatus, Snapshot};
use crate::status_repo::StatusRepo;
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock, broadcast, watch};
use tokio::time::{Duration, Instant};

/// Sources, refresh cadence and publishing for the aggregator.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub sources: Vec<String>,
    pub mode: RefreshMode,
    pub interval: Duration,
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Idle,
}

/// Marks a cycle as loading; if the cycle is dropped before it completes,
/// the flag goes back to what it was when the cycle started.
struct LoadingGuard<'a> {
    loading: &'a AtomicBool,
    previous: bool,
    completed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn start(loading: &'a AtomicBool) -> Self {
        let previous = loading.swap(true, Ordering::SeqCst);
        Self {
            loading,
            previous,
            completed: false,
        }
    }

    fn complete(mut self) {
        self.loading.store(false, Ordering::SeqCst);
        self.completed = true;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.loading.store(self.previous, Ordering::SeqCst);
        }
    }
}

/// Everything a client needs to draw the list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusView {
    pub loading: bool,
    pub refreshed_at: Option<u64>,
    pub next_refresh_secs: u64,
    pub statuses: Vec<ServiceStatus>,
}

impl StatusView {
    pub fn new(snapshot: &Snapshot, loading: bool, next_refresh_in: Duration) -> Self {
        Self {
            loading,
            refreshed_at: snapshot.refreshed_at,
            next_refresh_secs: next_refresh_in.as_secs_f64().ceil() as u64,
            statuses: snapshot.render_list().cloned().collect(),
        }
    }
}

pub struct StatusAggregator {
    repo: StatusRepo,
    config: AggregatorConfig,
    snapshot: RwLock<Snapshot>,
    /// True until the first cycle completes and while a cycle is running.
    loading: AtomicBool,
    /// Serializes refresh cycles so a later cycle always lands after an earlier one.
    refresh_lock: Mutex<()>,
    tx: broadcast::Sender<Snapshot>,
    next_refresh: watch::Sender<Instant>,
    refreshes_total: AtomicU64,
}

impl StatusAggregator {
    pub fn new(repo: StatusRepo, config: AggregatorConfig) -> Self {
        let (tx, _) = broadcast::channel(config.broadcast_capacity);
        let (next_refresh, _) = watch::channel(Instant::now() + config.interval);
        Self {
            repo,
            config,
            snapshot: RwLock::new(Snapshot::default()),
            loading: AtomicBool::new(true),
            refresh_lock: Mutex::new(()),
            tx,
            next_refresh,
            refreshes_total: AtomicU64::new(0),
        }
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    pub fn sources(&self) -> &[String] {
        &self.config.sources
    }

    /// Completed refresh cycles since startup.
    pub fn refreshes_total(&self) -> u64 {
        self.refreshes_total.load(Ordering::Relaxed)
    }

    /// Receives the snapshot after every completed refresh.
    pub fn subscribe(&self) -> broadcast::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    /// Watches the deadline of the next timer-driven refresh; it moves after every completed cycle.
    pub fn subscribe_next_refresh(&self) -> watch::Receiver<Instant> {
        self.next_refresh.subscribe()
    }

    pub fn next_refresh_in(&self) -> Duration {
        self.next_refresh
            .borrow()
            .saturating_duration_since(Instant::now())
    }

    pub fn phase(&self) -> Phase {
        if self.loading.load(Ordering::SeqCst) {
            Phase::Loading
        } else {
            Phase::Idle
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn view(&self) -> StatusView {
        let snapshot = self.snapshot.read().await;
        StatusView::new(
            &snapshot,
            self.phase() == Phase::Loading,
            self.next_refresh_in(),
        )
    }

    /// Runs one cycle: fetch all sources concurrently, wait for every one to settle,
    /// then replace or merge the snapshot in a single update. A failing source is
    /// logged and skipped.
    pub async fn refresh(&self) -> RefreshSummary {
        let _cycle = self.refresh_lock.lock().await;
        let loading = LoadingGuard::start(&self.loading);
        let started = Instant::now();

        let results = join_all(self.config.sources.iter().map(|source| async move {
            (source.as_str(), self.repo.fetch_status(source).await)
        }))
        .await;

        let mut summary = RefreshSummary::default();
        let mut fetched: HashMap<String, ServiceStatus> = HashMap::with_capacity(results.len());
        for (source, result) in results {
            match result {
                Ok(status) => {
                    summary.succeeded += 1;
                    fetched.insert(status.name.clone(), status);
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(
                        source,
                        error = %e,
                        operation = "fetch_status",
                        "status fetch failed"
                    );
                }
            }
        }

        let snapshot = {
            let mut current = self.snapshot.write().await;
            match self.config.mode {
                RefreshMode::Replace => current.services = fetched,
                RefreshMode::Merge => {
                    for status in fetched.into_values() {
                        current.upsert(status);
                    }
                }
            }
            current.refreshed_at = Some(chrono::Utc::now().timestamp_millis().max(0) as u64);
            current.clone()
        };
        loading.complete();

        self.next_refresh
            .send_replace(Instant::now() + self.config.interval);
        self.refreshes_total.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            services = snapshot.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "refresh complete"
        );
        if self.tx.send(snapshot).is_err() {
            tracing::debug!(
                operation = "broadcast_snapshot",
                "No active WebSocket clients; broadcast channel has no receivers"
            );
        }
        summary
    }
}
