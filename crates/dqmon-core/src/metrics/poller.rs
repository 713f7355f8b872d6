use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{BackendClient, FetchError, SystemMetrics};

/// Smallest accepted tick period; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Where metrics snapshots come from.
///
/// Polling over HTTP is the transport used by [`BackendClient`]. A push
/// transport can implement this trait and keep the poller's public contract.
pub trait MetricsSource: Send + Sync + 'static {
    fn fetch_metrics(&self) -> impl Future<Output = Result<SystemMetrics, FetchError>> + Send;
}

impl MetricsSource for BackendClient {
    async fn fetch_metrics(&self) -> Result<SystemMetrics, FetchError> {
        BackendClient::fetch_metrics(self).await
    }
}

/// Point-in-time view of a poller: latest snapshot plus error/staleness data.
#[derive(Debug, Clone)]
pub struct PollerStatus {
    /// Last successfully fetched metrics, or the fallback.
    pub snapshot: Arc<SystemMetrics>,
    /// Failure of the most recent fetch; cleared by the next success.
    pub error: Option<FetchError>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    /// Ticks skipped because the previous fetch was still in flight.
    pub skipped_ticks: u64,
    pub running: bool,
}

impl PollerStatus {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// True when no fetch has succeeded within `max_age` of `now`.
    pub fn is_stale(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        match self.last_success {
            None => true,
            Some(at) => match (now - at).to_std() {
                Ok(age) => age > max_age,
                Err(_) => false, // last_success is in the future
            },
        }
    }
}

#[derive(Debug)]
struct PollState {
    snapshot: Arc<SystemMetrics>,
    error: Option<FetchError>,
    last_success: Option<DateTime<Utc>>,
    last_attempt: Option<DateTime<Utc>>,
    consecutive_failures: u32,
    skipped_ticks: u64,
}

struct Shared<S> {
    source: S,
    state: Mutex<PollState>,
    in_flight: AtomicBool,
    /// Bumped on every stop; a fetch started under an older epoch is discarded.
    epoch: AtomicU64,
    shutdown: CancellationToken,
    snapshot_tx: watch::Sender<Arc<SystemMetrics>>,
}

struct Run {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Periodically fetches [`SystemMetrics`] and keeps the latest snapshot.
///
/// - Never surfaces fetch errors to callers; failures keep the previous
///   snapshot, set the error flag and are logged.
/// - At most one fetch is in flight; a tick that fires during a fetch is
///   skipped.
/// - After [`stop`](Self::stop) nothing mutates the snapshot, including a
///   fetch that was already in flight.
///
/// Must be started from within a tokio runtime.
pub struct MetricsPoller<S: MetricsSource = BackendClient> {
    shared: Arc<Shared<S>>,
    run: Mutex<Option<Run>>,
}

impl<S: MetricsSource> MetricsPoller<S> {
    /// Create a stopped poller whose snapshot starts as `fallback`.
    pub fn new(source: S, fallback: SystemMetrics) -> Self {
        Self::with_shutdown(source, fallback, CancellationToken::new())
    }

    /// Create a poller that also stops when `shutdown` is cancelled.
    pub fn with_shutdown(source: S, fallback: SystemMetrics, shutdown: CancellationToken) -> Self {
        let snapshot = Arc::new(fallback);
        let (snapshot_tx, _) = watch::channel(snapshot.clone());
        Self {
            shared: Arc::new(Shared {
                source,
                state: Mutex::new(PollState {
                    snapshot,
                    error: None,
                    last_success: None,
                    last_attempt: None,
                    consecutive_failures: 0,
                    skipped_ticks: 0,
                }),
                in_flight: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                shutdown,
                snapshot_tx,
            }),
            run: Mutex::new(None),
        }
    }

    /// Begin polling every `interval`. The first fetch happens immediately.
    ///
    /// Calling `start` on a running poller does nothing.
    pub fn start(&self, interval: Duration) {
        let mut run = lock_run(&self.run);
        if let Some(current) = run.as_ref()
            && !current.token.is_cancelled()
        {
            debug!(event = "core.metrics_poller.start_ignored", reason = "already running");
            return;
        }

        let period = if interval < MIN_INTERVAL {
            warn!(
                event = "core.metrics_poller.interval_clamped",
                requested_ms = interval.as_millis() as u64,
                "Poll interval too small, using 1ms"
            );
            MIN_INTERVAL
        } else {
            interval
        };

        let token = self.shared.shutdown.child_token();
        let handle = tokio::spawn(run_ticker(self.shared.clone(), token.clone(), period));

        info!(
            event = "core.metrics_poller.started",
            interval_ms = period.as_millis() as u64
        );
        *run = Some(Run { token, handle });
    }

    /// Stop polling. The snapshot and error state are kept.
    ///
    /// A fetch already in flight may finish but its result is discarded.
    pub fn stop(&self) {
        {
            let _state = lock_state(&self.shared.state);
            self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(run) = lock_run(&self.run).take() {
            run.token.cancel();
            info!(event = "core.metrics_poller.stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        lock_run(&self.run)
            .as_ref()
            .is_some_and(|run| !run.token.is_cancelled() && !run.handle.is_finished())
    }

    /// Fetch once right now, outside the tick schedule.
    ///
    /// Returns true if the snapshot was replaced. Returns false when the
    /// fetch failed, was discarded, or was skipped because another fetch
    /// was already in flight.
    pub async fn refresh(&self) -> bool {
        let Some(_guard) = InFlightGuard::try_acquire(&self.shared.in_flight) else {
            debug!(event = "core.metrics_poller.refresh_skipped", reason = "fetch in flight");
            return false;
        };
        let epoch = self.shared.epoch.load(Ordering::SeqCst);
        fetch_and_apply(&self.shared, epoch).await
    }

    /// The latest snapshot. Repeated calls without an intervening
    /// successful fetch return the same `Arc`.
    pub fn snapshot(&self) -> Arc<SystemMetrics> {
        lock_state(&self.shared.state).snapshot.clone()
    }

    pub fn status(&self) -> PollerStatus {
        let state = lock_state(&self.shared.state);
        PollerStatus {
            snapshot: state.snapshot.clone(),
            error: state.error.clone(),
            last_success: state.last_success,
            last_attempt: state.last_attempt,
            consecutive_failures: state.consecutive_failures,
            skipped_ticks: state.skipped_ticks,
            running: self.is_running(),
        }
    }

    /// Observe every snapshot replacement.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SystemMetrics>> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn source(&self) -> &S {
        &self.shared.source
    }
}

impl<S: MetricsSource> Drop for MetricsPoller<S> {
    fn drop(&mut self) {
        if let Some(run) = lock_run(&self.run).take() {
            run.token.cancel();
        }
    }
}

async fn run_ticker<S: MetricsSource>(
    shared: Arc<Shared<S>>,
    token: CancellationToken,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                if shared.in_flight.swap(true, Ordering::SeqCst) {
                    lock_state(&shared.state).skipped_ticks += 1;
                    debug!(event = "core.metrics_poller.tick_skipped", reason = "fetch in flight");
                    continue;
                }
                let epoch = shared.epoch.load(Ordering::SeqCst);
                let fetch_shared = shared.clone();
                tokio::spawn(async move {
                    let _guard = InFlightGuard::adopt(&fetch_shared.in_flight);
                    fetch_and_apply(&fetch_shared, epoch).await;
                });
            }
        }
    }

    debug!(event = "core.metrics_poller.ticker_exited");
}

async fn fetch_and_apply<S: MetricsSource>(shared: &Shared<S>, epoch: u64) -> bool {
    let result = shared.source.fetch_metrics().await;

    // Checked under the state lock so a concurrent stop() is ordered before or after.
    let mut state = lock_state(&shared.state);
    if shared.epoch.load(Ordering::SeqCst) != epoch || shared.shutdown.is_cancelled() {
        debug!(event = "core.metrics_poller.result_discarded", reason = "stopped");
        return false;
    }

    let now = Utc::now();
    state.last_attempt = Some(now);

    match result {
        Ok(metrics) => {
            if !metrics.is_consistent() {
                warn!(
                    event = "core.metrics_poller.inconsistent_snapshot",
                    total_processed = metrics.total_processed,
                    total_valid = metrics.total_valid,
                    total_invalid = metrics.total_invalid,
                );
            }
            if state.consecutive_failures > 0 {
                info!(
                    event = "core.metrics_poller.recovered",
                    failures = state.consecutive_failures
                );
            }
            let snapshot = Arc::new(metrics);
            state.snapshot = snapshot.clone();
            state.error = None;
            state.last_success = Some(now);
            state.consecutive_failures = 0;
            drop(state);

            shared.snapshot_tx.send_replace(snapshot);
            debug!(event = "core.metrics_poller.snapshot_updated");
            true
        }
        Err(e) => {
            state.consecutive_failures = state.consecutive_failures.saturating_add(1);
            warn!(
                event = "core.metrics_poller.fetch_failed",
                error_kind = e.kind(),
                error = %e,
                consecutive_failures = state.consecutive_failures,
                "Keeping previous snapshot"
            );
            state.error = Some(e);
            false
        }
    }
}

/// Clears the in-flight flag when a fetch ends, even if its task is aborted.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }

    /// Take ownership of a flag the caller already set.
    fn adopt(flag: &'a AtomicBool) -> Self {
        Self { flag }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

fn lock_state(state: &Mutex<PollState>) -> MutexGuard<'_, PollState> {
    state.lock().unwrap_or_else(|e| {
        warn!(event = "core.metrics_poller.lock_poisoned");
        e.into_inner()
    })
}

fn lock_run(run: &Mutex<Option<Run>>) -> MutexGuard<'_, Option<Run>> {
    run.lock().unwrap_or_else(|e| e.into_inner())
}
