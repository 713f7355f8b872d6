use crate::errors::DqmonError;

/// Failure talking to the quarantine backend.
///
/// Covers the three failure classes a request can hit (transport, non-2xx
/// status, undecodable body) plus client-side setup failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Backend returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Not found: {url}")]
    NotFound { url: String },

    #[error("Malformed response from {url}: {message}")]
    MalformedBody { url: String, message: String },

    #[error("Invalid backend URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Could not build HTTP client: {message}")]
    ClientBuild { message: String },
}

impl FetchError {
    /// Short failure class used in log events and status displays.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "transport",
            FetchError::Status { .. } | FetchError::NotFound { .. } => "status",
            FetchError::MalformedBody { .. } => "malformed_body",
            FetchError::InvalidUrl { .. } => "invalid_url",
            FetchError::ClientBuild { .. } => "client_build",
        }
    }
}

impl DqmonError for FetchError {
    fn error_code(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "FETCH_TRANSPORT_FAILED",
            FetchError::Status { .. } => "FETCH_BAD_STATUS",
            FetchError::NotFound { .. } => "FETCH_NOT_FOUND",
            FetchError::MalformedBody { .. } => "FETCH_MALFORMED_BODY",
            FetchError::InvalidUrl { .. } => "FETCH_INVALID_URL",
            FetchError::ClientBuild { .. } => "FETCH_CLIENT_BUILD_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            FetchError::NotFound { .. } | FetchError::InvalidUrl { .. }
        )
    }
}
