pub mod client;
pub mod errors;
pub mod types;

pub use client::BackendClient;
pub use errors::FetchError;
pub use types::{
    BackendHealth, QuarantineRecord, QuarantineResponse, SystemMetrics, parse_timestamp,
};
