use crate::errors::DqmonError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("Live feed capacity must be at least 1")]
    InvalidCapacity,

    #[error("Live feed was never started, nothing to resume")]
    NotStarted,

    #[error("Live feed source is exhausted; restart the source first")]
    SourceExhausted,
}

impl DqmonError for FeedError {
    fn error_code(&self) -> &'static str {
        match self {
            FeedError::InvalidCapacity => "FEED_INVALID_CAPACITY",
            FeedError::NotStarted => "FEED_NOT_STARTED",
            FeedError::SourceExhausted => "FEED_SOURCE_EXHAUSTED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, FeedError::InvalidCapacity)
    }
}
