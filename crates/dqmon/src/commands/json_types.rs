use chrono::{DateTime, Utc};
use serde::Serialize;

use dqmon_core::format::{ErrorShare, error_shares, format_percentage};
use dqmon_core::{PollerStatus, QuarantineRecord, QuarantineResponse, SystemMetrics};

/// `dqmon metrics --json` output: backend values plus derived display values.
#[derive(Serialize)]
pub struct MetricsOutput<'a> {
    #[serde(flatten)]
    pub metrics: &'a SystemMetrics,
    pub valid_percentage: String,
    pub invalid_percentage: String,
    pub error_shares: Vec<ErrorShare>,
    pub last_success: Option<DateTime<Utc>>,
    /// Set when the latest fetch failed and older (or fallback) values are shown.
    pub error: Option<String>,
}

impl<'a> MetricsOutput<'a> {
    pub fn from_status(status: &'a PollerStatus) -> Self {
        let metrics = status.snapshot.as_ref();
        Self {
            metrics,
            valid_percentage: format_percentage(metrics.valid_percentage()),
            invalid_percentage: format_percentage(metrics.invalid_percentage()),
            error_shares: error_shares(metrics),
            last_success: status.last_success,
            error: status.error.as_ref().map(|e| e.to_string()),
        }
    }
}

/// `dqmon records --json` output.
#[derive(Serialize)]
pub struct RecordsOutput<'a> {
    pub items: Vec<&'a QuarantineRecord>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<&'a str>,
    pub error: Option<String>,
}

impl<'a> RecordsOutput<'a> {
    pub fn new(
        response: &'a QuarantineResponse,
        items: Vec<&'a QuarantineRecord>,
        search: Option<&'a str>,
        error: Option<String>,
    ) -> Self {
        Self {
            items,
            total: response.total,
            page: response.page,
            page_size: response.page_size,
            total_pages: response.total_pages(),
            search,
            error,
        }
    }
}

/// `dqmon health --json` output.
#[derive(Serialize)]
pub struct HealthOutput<'a> {
    pub backend_url: &'a str,
    pub status: &'a str,
    pub version: &'a str,
    pub healthy: bool,
}
