//! Quarantined record listing.

pub mod filters;
pub mod lister;

pub use filters::{ALL_ERROR_TYPES, ALL_TOPICS, RecordFilters, RecordQuery};
pub use lister::{ListerState, RecordLister, RecordSource};
