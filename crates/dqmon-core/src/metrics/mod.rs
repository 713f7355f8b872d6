//! Aggregate metrics polling.

pub mod poller;

pub use poller::{MetricsPoller, MetricsSource, PollerStatus};
