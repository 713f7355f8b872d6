//! Default values and effective-value accessors for configuration types.

use std::time::Duration;

use crate::config::types::{BackendConfig, LiveConfig, MetricsConfig, RecordsConfig};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page size the backend accepts.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_LIVE_INTERVAL_MS: u64 = 800;
pub const DEFAULT_LIVE_CAPACITY: usize = 50;
pub const DEFAULT_ERROR_PROBABILITY: f64 = 0.3;
pub const DEFAULT_STREAM: &str = "raw-events";

/// Environment variable that overrides `backend.base_url`.
pub const BACKEND_URL_ENV: &str = "DQMON_BACKEND_URL";

impl BackendConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }
}

impl MetricsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }
}

impl RecordsConfig {
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

impl LiveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.unwrap_or(DEFAULT_LIVE_INTERVAL_MS))
    }

    pub fn capacity(&self) -> usize {
        self.capacity.unwrap_or(DEFAULT_LIVE_CAPACITY)
    }

    pub fn error_probability(&self) -> f64 {
        self.error_probability.unwrap_or(DEFAULT_ERROR_PROBABILITY)
    }

    pub fn stream(&self) -> &str {
        self.stream.as_deref().unwrap_or(DEFAULT_STREAM)
    }
}
