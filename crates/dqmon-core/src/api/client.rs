//! Async HTTP client for the quarantine backend.
//!
//! This is the only place that speaks HTTP. Every method classifies its
//! failure into a [`FetchError`]; deciding what to show instead is left to
//! the poller and lister that call it.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::errors::FetchError;
use crate::api::types::{BackendHealth, QuarantineRecord, QuarantineResponse, SystemMetrics};
use crate::config::BackendConfig;
use crate::records::RecordQuery;

/// Client for the quarantine backend API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BackendClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let parsed = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl {
                url: base_url.to_string(),
                message: "expected an http(s) base URL".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::ClientBuild {
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, FetchError> {
        Self::new(config.base_url(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `GET /api/metrics`
    pub async fn fetch_metrics(&self) -> Result<SystemMetrics, FetchError> {
        let url = self.endpoint(&["api", "metrics"], &[])?;
        self.get_json(url).await
    }

    /// `GET /api/quarantine/records?page=..&page_size=..[&topic=..][&error_type=..]`
    pub async fn fetch_records(&self, query: &RecordQuery) -> Result<QuarantineResponse, FetchError> {
        let url = self.endpoint(&["api", "quarantine", "records"], &query.to_query_pairs())?;
        self.get_json(url).await
    }

    /// `GET /api/quarantine/records/{id}`
    pub async fn fetch_record(&self, id: &str) -> Result<QuarantineRecord, FetchError> {
        let url = self.endpoint(&["api", "quarantine", "records", id], &[])?;
        self.get_json(url).await
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<BackendHealth, FetchError> {
        let url = self.endpoint(&["health"], &[])?;
        self.get_json(url).await
    }

    /// Build an endpoint URL from path segments and query pairs.
    ///
    /// Segments are percent-encoded, so record ids cannot escape their path slot.
    fn endpoint(&self, segments: &[&str], query: &[(&'static str, String)]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl {
                url: self.base_url.to_string(),
                message: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!(event = "core.backend.request_started", url = %url);

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let parsed = serde_json::from_slice(&body).map_err(|e| FetchError::MalformedBody {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!(
            event = "core.backend.request_completed",
            url = %url,
            status = status.as_u16(),
            bytes = body.len()
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecordFilters;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        assert!(matches!(
            BackendClient::new("ftp://example.com", Duration::from_secs(1)),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            BackendClient::new("not a url", Duration::from_secs(1)),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_new_client_keeps_base_url() {
        let client = BackendClient::new("http://localhost:8080", Duration::from_millis(250)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/");
    }

    #[test]
    fn test_endpoint_joins_segments_with_or_without_trailing_slash() {
        for base in ["http://localhost:8080", "http://localhost:8080/"] {
            let url = client(base).endpoint(&["api", "metrics"], &[]).unwrap();
            assert_eq!(url.as_str(), "http://localhost:8080/api/metrics");
        }
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let url = client("http://gateway/dq/")
            .endpoint(&["api", "metrics"], &[])
            .unwrap();
        assert_eq!(url.as_str(), "http://gateway/dq/api/metrics");
    }

    #[test]
    fn test_record_id_is_percent_encoded() {
        let url = client("http://localhost:8080")
            .endpoint(&["api", "quarantine", "records", "a/b c"], &[])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/quarantine/records/a%2Fb%20c"
        );
    }

    #[test]
    fn test_records_query_omits_sentinel_filters() {
        let query = RecordQuery::new(
            1,
            10,
            RecordFilters::from_selections("All Topics", "All Error Types"),
        );
        let url = client("http://localhost:8080")
            .endpoint(&["api", "quarantine", "records"], &query.to_query_pairs())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/quarantine/records?page=1&page_size=10"
        );
    }
}
