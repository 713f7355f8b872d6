use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate pipeline metrics as reported by `GET /api/metrics`.
///
/// Values are taken verbatim from the backend. Nothing here recomputes or
/// reconciles totals; [`SystemMetrics::is_consistent`] only reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub total_processed: u64,
    pub total_valid: u64,
    pub total_invalid: u64,
    pub validation_rate: f64,
    /// Events per second.
    pub throughput: f64,
    /// Occurrence count per error kind, e.g. `"missing_field" -> 20`.
    pub error_breakdown: BTreeMap<String, u64>,
}

impl SystemMetrics {
    /// Whether valid + invalid adds up to the processed total.
    pub fn is_consistent(&self) -> bool {
        self.total_valid.checked_add(self.total_invalid) == Some(self.total_processed)
    }

    /// Share of valid records in percent, 0 when nothing was processed.
    pub fn valid_percentage(&self) -> f64 {
        percentage(self.total_valid, self.total_processed)
    }

    /// Share of quarantined records in percent, 0 when nothing was processed.
    pub fn invalid_percentage(&self) -> f64 {
        percentage(self.total_invalid, self.total_processed)
    }

    /// Sum of all error breakdown counts.
    pub fn total_errors(&self) -> u64 {
        self.error_breakdown.values().sum()
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// One message that failed validation and is held in quarantine.
///
/// Read-only on the client side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarantineRecord {
    pub id: String,
    pub topic: String,
    pub partition: u32,
    pub offset: u64,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Original payload, opaque to the dashboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    pub error_type: String,
    pub error_message: String,
    pub schema_name: String,
    pub schema_version: String,
    #[serde(rename = "meta_data", alias = "metadata", default)]
    pub metadata: serde_json::Value,
    pub created_at: String,
}

impl QuarantineRecord {
    /// Parse `created_at`, accepting RFC 3339 and naive (UTC assumed) timestamps.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    /// Case-insensitive match against id, error type/message and schema name.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            &self.id,
            &self.error_type,
            &self.error_message,
            &self.schema_name,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Parse an ISO-8601 timestamp as sent by the backend.
///
/// The backend may omit the offset; such values are treated as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// One page of quarantined records from `GET /api/quarantine/records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarantineResponse {
    /// Records in the order the backend returned them.
    pub items: Vec<QuarantineRecord>,
    /// Count across all pages.
    pub total: u64,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl QuarantineResponse {
    /// The empty page rendered when a listing could not be fetched.
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page,
            page_size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pages needed for `total` records, 0 when there are none.
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }

    /// 1-based (first, last) row numbers shown on this page.
    pub fn display_range(&self) -> Option<(u64, u64)> {
        if self.items.is_empty() {
            return None;
        }
        let first = u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size) + 1;
        let last = first + self.items.len() as u64 - 1;
        Some((first, last))
    }

    /// Records on this page matching a free-text search.
    pub fn search(&self, needle: &str) -> Vec<&QuarantineRecord> {
        self.items
            .iter()
            .filter(|record| record.matches_search(needle))
            .collect()
    }
}

/// Backend liveness as reported by `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendHealth {
    pub status: String,
    pub version: String,
}

impl BackendHealth {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, error_type: &str) -> QuarantineRecord {
        QuarantineRecord {
            id: id.to_string(),
            topic: "raw-events".to_string(),
            partition: 1,
            offset: 12345,
            timestamp: "2024-05-01T10:00:00Z".to_string(),
            key: None,
            value: None,
            error_type: error_type.to_string(),
            error_message: "Missing required field: user_id".to_string(),
            schema_name: "user_event".to_string(),
            schema_version: "1.0.0".to_string(),
            metadata: serde_json::Value::Null,
            created_at: "2024-05-01T10:00:01".to_string(),
        }
    }

    #[test]
    fn test_metrics_scenario_deserializes_verbatim() {
        let body = r#"{
            "total_processed": 1000,
            "total_valid": 950,
            "total_invalid": 50,
            "validation_rate": 0.95,
            "throughput": 120,
            "error_breakdown": {"schema_violation": 30, "missing_field": 20}
        }"#;
        let metrics: SystemMetrics = serde_json::from_str(body).unwrap();

        assert_eq!(metrics.total_processed, 1000);
        assert_eq!(metrics.validation_rate, 0.95);
        assert_eq!(metrics.throughput, 120.0);
        assert_eq!(metrics.error_breakdown["schema_violation"], 30);
        assert!(metrics.is_consistent());
        assert_eq!(metrics.valid_percentage(), 95.0);
        assert_eq!(metrics.invalid_percentage(), 5.0);
        assert_eq!(metrics.total_errors(), 50);
    }

    #[test]
    fn test_inconsistent_metrics_are_reported_not_fixed() {
        let metrics = SystemMetrics {
            total_processed: 10,
            total_valid: 9,
            total_invalid: 5,
            ..Default::default()
        };
        assert!(!metrics.is_consistent());
        assert_eq!(metrics.total_invalid, 5);
    }

    #[test]
    fn test_zeroed_metrics_percentages() {
        let metrics = SystemMetrics::default();
        assert_eq!(metrics.valid_percentage(), 0.0);
        assert_eq!(metrics.invalid_percentage(), 0.0);
        assert!(metrics.is_consistent());
    }

    #[test]
    fn test_record_accepts_meta_data_and_metadata() {
        let wire = r#"{
            "id": "qr-1", "topic": "raw-events", "partition": 0, "offset": 7,
            "timestamp": "2024-05-01T10:00:00Z", "error_type": "missing_field",
            "error_message": "boom", "schema_name": "user_event",
            "schema_version": "1.0.0", "meta_data": {"retries": 2},
            "created_at": "2024-05-01T10:00:00Z"
        }"#;
        let record: QuarantineRecord = serde_json::from_str(wire).unwrap();
        assert_eq!(record.metadata["retries"], 2);
        assert!(record.key.is_none());

        let aliased = wire.replace("meta_data", "metadata");
        let record: QuarantineRecord = serde_json::from_str(&aliased).unwrap();
        assert_eq!(record.metadata["retries"], 2);
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(record("qr-1", "x").created_at_utc().is_some());
    }

    #[test]
    fn test_empty_page() {
        let page = QuarantineResponse::empty(3, 10);
        assert!(page.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 3);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.display_range(), None);
        assert_eq!(page.total_pages(), 0);
    }

    #[test]
    fn test_display_range_and_pages() {
        let page = QuarantineResponse {
            items: vec![record("qr-11", "a"), record("qr-12", "b")],
            total: 12,
            page: 2,
            page_size: 10,
        };
        assert_eq!(page.display_range(), Some((11, 12)));
        assert_eq!(page.total_pages(), 2);
    }

    #[test]
    fn test_search_matches_fields_case_insensitively() {
        let mut other = record("qr-2", "invalid_format");
        other.schema_name = "order_event".to_string();
        other.error_message = "bad date".to_string();
        let page = QuarantineResponse {
            items: vec![record("qr-1", "missing_field"), other],
            total: 2,
            page: 1,
            page_size: 10,
        };

        assert_eq!(page.search("ORDER").len(), 1);
        assert_eq!(page.search("qr-1")[0].id, "qr-1");
        assert_eq!(page.search("missing").len(), 1);
        assert_eq!(page.search("  ").len(), 2);
    }

    #[test]
    fn test_backend_health() {
        let health: BackendHealth =
            serde_json::from_str(r#"{"status":"healthy","version":"1.0.0"}"#).unwrap();
        assert!(health.is_healthy());
    }
}
