//! Sources of live log entries.
//!
//! The feed pulls one entry per tick from a [`LogSource`]. The simulation
//! produces entries on demand; a real transport (socket, SSE) pushes decoded
//! entries into a [`ChannelLogSource`] and the feed consumes them unchanged.

use std::future::Future;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use crate::config::defaults::DEFAULT_ERROR_PROBABILITY;
use crate::live::types::{EntryMetadata, LiveLogEntry, LogLevel};

/// Offsets of simulated entries start here.
const BASE_OFFSET: u64 = 100_000;
const SIMULATED_PARTITIONS: u32 = 3;

/// A lazy, possibly infinite sequence of log entries.
pub trait LogSource: Send + 'static {
    /// Next entry, or `None` when the sequence has ended.
    fn next_entry(&mut self) -> impl Future<Output = Option<LiveLogEntry>> + Send;

    /// Make an ended sequence produce entries again, where possible.
    fn restart(&mut self) {}

    /// Whether the feed should pull once per tick. Sources that block until
    /// an entry is pushed are drained as fast as entries arrive.
    fn is_paced(&self) -> bool {
        true
    }
}

/// Random INFO/ERROR entries standing in for the pipeline's event stream.
pub struct SimulatedLogSource {
    rng: StdRng,
    error_probability: f64,
    next_id: u64,
    limit: Option<u64>,
    emitted: u64,
}

impl SimulatedLogSource {
    /// Unseeded source with the given ERROR probability (clamped to `[0, 1]`).
    pub fn new(error_probability: f64) -> Self {
        Self::from_rng(StdRng::from_os_rng(), error_probability)
    }

    /// Deterministic source for reproducible streams.
    pub fn with_seed(seed: u64, error_probability: f64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), error_probability)
    }

    fn from_rng(rng: StdRng, error_probability: f64) -> Self {
        let error_probability = if error_probability.is_nan() {
            DEFAULT_ERROR_PROBABILITY
        } else {
            error_probability.clamp(0.0, 1.0)
        };
        Self {
            rng,
            error_probability,
            next_id: 1,
            limit: None,
            emitted: 0,
        }
    }

    /// End the sequence after `limit` entries (until restarted).
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn error_probability(&self) -> f64 {
        self.error_probability
    }

    /// Synthesize the next entry.
    pub fn generate(&mut self) -> LiveLogEntry {
        let id = self.next_id;
        self.next_id += 1;

        let is_error = self.rng.random_bool(self.error_probability);
        let (level, source, message) = if is_error {
            (
                LogLevel::Error,
                "kafka-consumer-error",
                format!(
                    "Validation failed: Schema mismatch for user_event v1.{}",
                    self.rng.random_range(0..5)
                ),
            )
        } else {
            (
                LogLevel::Info,
                "schema-validator",
                format!(
                    "Successfully processed event {}",
                    self.rng.random_range(0..100_000)
                ),
            )
        };

        LiveLogEntry {
            id,
            timestamp: Utc::now(),
            level,
            source: source.to_string(),
            message,
            metadata: EntryMetadata {
                partition: self.rng.random_range(0..SIMULATED_PARTITIONS),
                offset: BASE_OFFSET + id,
            },
        }
    }
}

impl LogSource for SimulatedLogSource {
    async fn next_entry(&mut self) -> Option<LiveLogEntry> {
        if self.limit.is_some_and(|limit| self.emitted >= limit) {
            return None;
        }
        self.emitted += 1;
        Some(self.generate())
    }

    /// Ids keep increasing across restarts.
    fn restart(&mut self) {
        self.emitted = 0;
    }
}

/// Entries pushed by an external transport through a channel.
pub struct ChannelLogSource {
    rx: mpsc::Receiver<LiveLogEntry>,
}

impl ChannelLogSource {
    /// Create a source and the sender a transport task writes into.
    pub fn new(buffer: usize) -> (Self, mpsc::Sender<LiveLogEntry>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { rx }, tx)
    }
}

impl LogSource for ChannelLogSource {
    async fn next_entry(&mut self) -> Option<LiveLogEntry> {
        self.rx.recv().await
    }

    fn is_paced(&self) -> bool {
        false
    }
}
