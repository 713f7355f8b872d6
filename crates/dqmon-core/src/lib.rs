//! dqmon-core: Client library for the data-quarantine dashboard
//!
//! This library talks to the quarantine backend and keeps the state the
//! dashboard renders: the latest metrics snapshot, pages of quarantined
//! records and a live tail of pipeline log entries. It is used by the
//! `dqmon` CLI.
//!
//! # Main Entry Points
//!
//! - [`context`] - Build a dashboard context and obtain components from it
//! - [`metrics`] - Periodic metrics polling
//! - [`records`] - Paginated, filtered record listing
//! - [`live`] - Bounded live log feed
//! - [`config`] - Configuration management

pub mod api;
pub mod config;
pub mod context;
pub mod errors;
pub mod events;
pub mod format;
pub mod live;
pub mod logging;
pub mod metrics;
pub mod records;

// Re-export commonly used types at crate root for convenience
pub use api::{
    BackendClient, BackendHealth, FetchError, QuarantineRecord, QuarantineResponse,
    SystemMetrics,
};
pub use config::DqmonConfig;
pub use context::DashboardContext;
pub use errors::{ConfigError, DqmonError, DqmonResult};
pub use live::{
    ChannelLogSource, FeedError, FeedStats, FeedStatus, LiveLogEntry, LiveLogFeed, LogLevel,
    LogSource, SimulatedLogSource,
};
pub use metrics::{MetricsPoller, MetricsSource, PollerStatus};
pub use records::{ListerState, RecordFilters, RecordLister, RecordQuery, RecordSource};

// Re-export logging initialization
pub use logging::init_logging;
