//! Configuration type definitions for dqmon.
//!
//! These types are deserialized from TOML config files. Every field is
//! optional so that project config can override user config field by field;
//! the accessor methods in [`super::defaults`] resolve the effective values.
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8080"
//! timeout_ms = 5000
//!
//! [metrics]
//! poll_interval_ms = 5000
//!
//! [records]
//! page_size = 10
//!
//! [live]
//! interval_ms = 800
//! capacity = 50
//! error_probability = 0.3
//! stream = "raw-events"
//! ```

use serde::{Deserialize, Serialize};

/// Main configuration loaded from TOML config files.
///
/// Loaded from:
/// 1. User config: `~/.dqmon/config.toml`
/// 2. Project config: `./.dqmon/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DqmonConfig {
    /// Quarantine backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Metrics poller settings
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Record lister settings
    #[serde(default)]
    pub records: RecordsConfig,

    /// Live log feed settings
    #[serde(default)]
    pub live: LiveConfig,
}

/// Backend connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BackendConfig {
    /// Base URL of the quarantine API (no trailing path).
    /// Default: `http://localhost:8080`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds.
    /// Default: 5000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Metrics poller configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MetricsConfig {
    /// Interval between metrics fetches in milliseconds.
    /// Default: 5000.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

/// Record lister configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RecordsConfig {
    /// Default page size for record listings (1..=100).
    /// Default: 10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Live log feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LiveConfig {
    /// Interval between generated entries in milliseconds.
    /// Default: 800.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,

    /// Maximum number of entries kept in the feed buffer.
    /// Default: 50.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,

    /// Probability that a simulated entry is an ERROR.
    /// Default: 0.3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_probability: Option<f64>,

    /// Stream label shown in the live monitor header.
    /// Default: `raw-events`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
}
