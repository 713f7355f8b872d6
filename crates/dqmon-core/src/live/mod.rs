//! Live log tail.
//!
//! A [`LiveLogFeed`] keeps a bounded, newest-first buffer of
//! [`LiveLogEntry`] values pulled from a [`LogSource`] and broadcasts each new
//! entry to subscribers.

pub mod buffer;
pub mod errors;
pub mod feed;
pub mod source;
pub mod types;

pub use buffer::LogBuffer;
pub use errors::FeedError;
pub use feed::LiveLogFeed;
pub use source::{ChannelLogSource, LogSource, SimulatedLogSource};
pub use types::{EntryMetadata, FeedStats, FeedStatus, LiveLogEntry, LogLevel};
