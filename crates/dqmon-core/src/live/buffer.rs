use std::collections::VecDeque;

use crate::live::errors::FeedError;
use crate::live::types::{FeedStats, LiveLogEntry, LogLevel};

/// Bounded newest-first buffer of live log entries.
///
/// Index 0 is always the newest entry; when full, the oldest entry is
/// evicted from the tail.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LiveLogEntry>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Result<Self, FeedError> {
        if capacity == 0 {
            return Err(FeedError::InvalidCapacity);
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Prepend an entry, evicting from the tail if full.
    pub fn push(&mut self, entry: LiveLogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Vec<LiveLogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn newest(&self) -> Option<&LiveLogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> FeedStats {
        self.entries
            .iter()
            .fold(FeedStats::default(), |mut stats, entry| {
                match entry.level {
                    LogLevel::Info => stats.info += 1,
                    LogLevel::Error => stats.error += 1,
                }
                stats
            })
    }
}
