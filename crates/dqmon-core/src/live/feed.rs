use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::live::buffer::LogBuffer;
use crate::live::errors::FeedError;
use crate::live::source::{LogSource, SimulatedLogSource};
use crate::live::types::{FeedStats, FeedStatus, LiveLogEntry};

const BROADCAST_CAPACITY: usize = 256;
const MIN_INTERVAL: Duration = Duration::from_millis(1);

struct FeedState {
    buffer: LogBuffer,
    status: FeedStatus,
    /// Period of the last `start`, reused by `resume`.
    interval: Option<Duration>,
}

struct Shared<S> {
    source: tokio::sync::Mutex<S>,
    state: Mutex<FeedState>,
    tx: broadcast::Sender<LiveLogEntry>,
    epoch: AtomicU64,
    shutdown: CancellationToken,
}

struct Run {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Bounded, newest-first tail of live log entries pulled from a [`LogSource`].
///
/// Paced sources are pulled once per tick. Pausing keeps the buffer and
/// resuming does not replay the ticks missed while paused. Nothing is added
/// to the buffer after [`stop`](Self::stop) returns.
pub struct LiveLogFeed<S: LogSource = SimulatedLogSource> {
    shared: Arc<Shared<S>>,
    run: Mutex<Option<Run>>,
}

impl<S: LogSource> LiveLogFeed<S> {
    pub fn new(source: S, capacity: usize) -> Result<Self, FeedError> {
        Self::with_shutdown(source, capacity, CancellationToken::new())
    }

    /// Create a feed that also stops when `shutdown` is cancelled.
    pub fn with_shutdown(
        source: S,
        capacity: usize,
        shutdown: CancellationToken,
    ) -> Result<Self, FeedError> {
        let buffer = LogBuffer::new(capacity)?;
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Ok(Self {
            shared: Arc::new(Shared {
                source: tokio::sync::Mutex::new(source),
                state: Mutex::new(FeedState {
                    buffer,
                    status: FeedStatus::Idle,
                    interval: None,
                }),
                tx,
                epoch: AtomicU64::new(0),
                shutdown,
            }),
            run: Mutex::new(None),
        })
    }

    /// Begin producing one entry per `interval`; the first arrives after one
    /// interval. Does nothing if the feed is live or its source is exhausted.
    pub fn start(&self, interval: Duration) {
        let mut run = lock_run(&self.run);

        let period = interval.max(MIN_INTERVAL);
        let epoch = {
            let mut state = lock_state(&self.shared.state);
            match state.status {
                FeedStatus::Live => {
                    debug!(event = "core.live_feed.start_ignored", reason = "already live");
                    return;
                }
                FeedStatus::Exhausted => {
                    info!(event = "core.live_feed.start_ignored", reason = "source exhausted");
                    return;
                }
                FeedStatus::Idle | FeedStatus::Paused => {}
            }
            if self.shared.shutdown.is_cancelled() {
                debug!(event = "core.live_feed.start_ignored", reason = "shut down");
                return;
            }
            state.status = FeedStatus::Live;
            state.interval = Some(period);
            self.shared.epoch.load(Ordering::SeqCst)
        };

        if let Some(previous) = run.take() {
            previous.token.cancel();
        }
        let token = self.shared.shutdown.child_token();
        let handle = tokio::spawn(run_feed(self.shared.clone(), token.clone(), period, epoch));

        info!(
            event = "core.live_feed.started",
            interval_ms = period.as_millis() as u64
        );
        *run = Some(Run { token, handle });
    }

    /// Halt the feed, keeping buffered entries.
    pub fn stop(&self) {
        {
            let mut state = lock_state(&self.shared.state);
            self.shared.epoch.fetch_add(1, Ordering::SeqCst);
            if state.status == FeedStatus::Live {
                state.status = FeedStatus::Paused;
            }
        }
        if let Some(run) = lock_run(&self.run).take() {
            run.token.cancel();
            info!(event = "core.live_feed.stopped");
        }
    }

    pub fn pause(&self) {
        self.stop();
    }

    /// Start again with the interval of the last `start`.
    pub fn resume(&self) -> Result<(), FeedError> {
        let (status, interval) = {
            let state = lock_state(&self.shared.state);
            (state.status, state.interval)
        };
        if status == FeedStatus::Exhausted {
            return Err(FeedError::SourceExhausted);
        }
        let interval = interval.ok_or(FeedError::NotStarted)?;
        self.start(interval);
        Ok(())
    }

    /// Restart the underlying source. An exhausted feed becomes paused and
    /// can be resumed; a live feed stays live.
    ///
    /// A live feed is stopped first so a pending pull releases the source.
    pub async fn restart_source(&self) {
        let was_live = self.is_live();
        if was_live {
            self.stop();
        }

        self.shared.source.lock().await.restart();
        {
            let mut state = lock_state(&self.shared.state);
            if state.status == FeedStatus::Exhausted {
                state.status = FeedStatus::Paused;
            }
        }
        info!(event = "core.live_feed.source_restarted", was_live = was_live);

        if was_live {
            if let Err(e) = self.resume() {
                warn!(event = "core.live_feed.resume_failed", error = %e);
            }
        }
    }

    /// Empty the buffer. Does not change whether the feed is live.
    pub fn clear(&self) {
        lock_state(&self.shared.state).buffer.clear();
        debug!(event = "core.live_feed.cleared");
    }

    /// Buffered entries, newest first.
    pub fn entries(&self) -> Vec<LiveLogEntry> {
        lock_state(&self.shared.state).buffer.entries()
    }

    pub fn latest(&self) -> Option<LiveLogEntry> {
        lock_state(&self.shared.state).buffer.newest().cloned()
    }

    pub fn len(&self) -> usize {
        lock_state(&self.shared.state).buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        lock_state(&self.shared.state).buffer.capacity()
    }

    pub fn status(&self) -> FeedStatus {
        lock_state(&self.shared.state).status
    }

    pub fn is_live(&self) -> bool {
        self.status() == FeedStatus::Live
    }

    pub fn stats(&self) -> FeedStats {
        lock_state(&self.shared.state).buffer.stats()
    }

    /// Receive each entry as it is added to the buffer.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveLogEntry> {
        self.shared.tx.subscribe()
    }
}

impl<S: LogSource> Drop for LiveLogFeed<S> {
    fn drop(&mut self) {
        if let Some(run) = lock_run(&self.run).take() {
            run.token.cancel();
        }
    }
}

async fn run_feed<S: LogSource>(
    shared: Arc<Shared<S>>,
    token: CancellationToken,
    period: Duration,
    epoch: u64,
) {
    let paced = shared.source.lock().await.is_paced();
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if paced {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
        }

        let next = tokio::select! {
            _ = token.cancelled() => break,
            entry = pull(&shared.source) => entry,
        };

        match next {
            Some(entry) => {
                if !append(&shared, epoch, entry) {
                    break;
                }
            }
            None => {
                let mut state = lock_state(&shared.state);
                if shared.epoch.load(Ordering::SeqCst) == epoch
                    && state.status == FeedStatus::Live
                {
                    state.status = FeedStatus::Exhausted;
                    info!(event = "core.live_feed.source_exhausted");
                }
                return;
            }
        }
    }

    // Cancelled by the shutdown token rather than stop().
    let mut state = lock_state(&shared.state);
    if shared.epoch.load(Ordering::SeqCst) == epoch && state.status == FeedStatus::Live {
        state.status = FeedStatus::Paused;
        info!(event = "core.live_feed.shutdown");
    }
}

async fn pull<S: LogSource>(source: &tokio::sync::Mutex<S>) -> Option<LiveLogEntry> {
    source.lock().await.next_entry().await
}

/// Prepend `entry` unless the feed was stopped since `epoch`.
fn append<S>(shared: &Shared<S>, epoch: u64, entry: LiveLogEntry) -> bool {
    let mut state = lock_state(&shared.state);
    if shared.epoch.load(Ordering::SeqCst) != epoch
        || state.status != FeedStatus::Live
        || shared.shutdown.is_cancelled()
    {
        debug!(event = "core.live_feed.entry_discarded", id = entry.id);
        return false;
    }
    state.buffer.push(entry.clone());
    drop(state);

    // Err only means nobody is subscribed.
    let _ = shared.tx.send(entry);
    true
}

fn lock_state(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(|e| {
        warn!(event = "core.live_feed.lock_poisoned");
        e.into_inner()
    })
}

fn lock_run(run: &Mutex<Option<Run>>) -> MutexGuard<'_, Option<Run>> {
    run.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::source::ChannelLogSource;

    fn simulated() -> SimulatedLogSource {
        SimulatedLogSource::with_seed(11, 0.3)
    }

    fn ids<S: LogSource>(feed: &LiveLogFeed<S>) -> Vec<u64> {
        feed.entries().iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            LiveLogFeed::new(simulated(), 0),
            Err(FeedError::InvalidCapacity)
        ));
    }

    #[tokio::test]
    async fn test_new_feed_is_idle_and_empty() {
        let feed = LiveLogFeed::new(simulated(), 50).unwrap();
        assert_eq!(feed.status(), FeedStatus::Idle);
        assert!(feed.is_empty());
        assert_eq!(feed.capacity(), 50);
        assert_eq!(feed.resume(), Err(FeedError::NotStarted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_buffer_is_bounded_and_newest_first() {
        let feed = LiveLogFeed::new(simulated(), 50).unwrap();
        feed.start(Duration::from_millis(800));

        tokio::time::sleep(Duration::from_millis(800 * 60 + 10)).await;

        let ids = ids(&feed);
        assert_eq!(ids.len(), 50);
        assert_eq!(ids[0], 60);
        assert_eq!(ids[49], 11);
        assert!(ids.windows(2).all(|w| w[0] > w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_entry_after_one_interval() {
        let feed = LiveLogFeed::new(simulated(), 50).unwrap();
        feed.start(Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(feed.is_empty());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(feed.len(), 1);
        assert!(feed.is_live());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_mutation_after_stop() {
        let feed = LiveLogFeed::new(simulated(), 50).unwrap();
        feed.start(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(350)).await;
        feed.stop();

        let before = ids(&feed);
        assert_eq!(before.len(), 3);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(ids(&feed), before);
        assert_eq!(feed.status(), FeedStatus::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_does_not_replay_missed_ticks() {
        let feed = LiveLogFeed::new(simulated(), 50).unwrap();
        feed.start(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(250)).await;
        feed.pause();
        assert_eq!(ids(&feed), vec![2, 1]);

        tokio::time::sleep(Duration::from_secs(1)).await;
        feed.resume().unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(ids(&feed), vec![4, 3, 2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_live_is_noop() {
        let feed = LiveLogFeed::new(simulated(), 50).unwrap();
        feed.start(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(50)).await;
        feed.start(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(160)).await;

        assert_eq!(feed.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_keeps_feed_live() {
        let feed = LiveLogFeed::new(simulated(), 50).unwrap();
        feed.start(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(250)).await;

        feed.clear();
        assert!(feed.is_empty());
        assert_eq!(feed.stats(), FeedStats::default());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(ids(&feed), vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_source_stops_feed() {
        let feed = LiveLogFeed::new(simulated().with_limit(3), 50).unwrap();
        feed.start(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(feed.len(), 3);
        assert_eq!(feed.status(), FeedStatus::Exhausted);
        assert_eq!(feed.resume(), Err(FeedError::SourceExhausted));

        feed.restart_source().await;
        assert_eq!(feed.status(), FeedStatus::Paused);
        feed.resume().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(ids(&feed), vec![6, 5, 4, 3, 2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_entries_in_order() {
        let feed = LiveLogFeed::new(simulated(), 50).unwrap();
        let mut rx = feed.subscribe();
        feed.start(Duration::from_millis(10));

        assert_eq!(rx.recv().await.unwrap().id, 1);
        assert_eq!(rx.recv().await.unwrap().id, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_count_levels() {
        let feed = LiveLogFeed::new(SimulatedLogSource::with_seed(3, 1.0), 50).unwrap();
        feed.start(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(55)).await;
        feed.stop();

        let stats = feed.stats();
        assert_eq!(stats.error, 5);
        assert_eq!(stats.info, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_token_pauses_feed() {
        let shutdown = CancellationToken::new();
        let feed = LiveLogFeed::with_shutdown(simulated(), 50, shutdown.clone()).unwrap();
        feed.start(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(150)).await;

        shutdown.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(feed.len(), 1);
        assert_eq!(feed.status(), FeedStatus::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_source_entries_arrive_newest_first() {
        let (source, tx) = ChannelLogSource::new(8);
        let feed = LiveLogFeed::new(source, 2).unwrap();
        feed.start(Duration::from_millis(800));

        let mut generator = simulated();
        for _ in 0..3 {
            tx.send(generator.generate()).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(ids(&feed), vec![3, 2]);

        drop(tx);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(feed.status(), FeedStatus::Exhausted);
    }

    #[tokio::test]
    async fn test_restart_source_does_not_wait_on_idle_channel() {
        let (source, tx) = ChannelLogSource::new(8);
        let feed = LiveLogFeed::new(source, 5).unwrap();
        feed.start(Duration::from_millis(800));
        tokio::time::sleep(Duration::from_millis(10)).await;

        tokio::time::timeout(Duration::from_secs(1), feed.restart_source())
            .await
            .expect("restart_source should not block on a pending pull");
        assert_eq!(feed.status(), FeedStatus::Live);

        tx.send(simulated().generate()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(ids(&feed), vec![1]);
    }
}
