//! Display values derived from fetched data.
//!
//! Nothing here mutates or corrects backend values; these helpers only turn
//! them into the strings the CLI prints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{QuarantineResponse, SystemMetrics};

pub const EMPTY_RECORDS_MESSAGE: &str = "No quarantined records found.";

/// Two-decimal percentage without the `%` sign, e.g. `"95.00"`.
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}", value)
}

/// Integer with comma thousands separators, e.g. `12,222`.
pub fn format_number(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Events-per-second with one decimal, e.g. `1,234.5/s`.
pub fn format_throughput(value: f64) -> String {
    let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
    let formatted = format!("{:.1}", value);
    let (int, frac) = formatted.split_once('.').unwrap_or((&formatted, "0"));
    format!("{}.{}/s", group_thousands(int), frac)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Human label for an error kind: the first underscore becomes a space.
pub fn error_label(kind: &str) -> String {
    kind.replacen('_', " ", 1)
}

/// One slice of the error distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorShare {
    pub kind: String,
    pub label: String,
    pub count: u64,
    /// Percentage of all breakdown errors, 0 when there are none.
    pub share: f64,
}

/// Error breakdown ordered by count (largest first), ties by kind.
pub fn error_shares(metrics: &SystemMetrics) -> Vec<ErrorShare> {
    let total = metrics.total_errors();
    let mut shares: Vec<ErrorShare> = metrics
        .error_breakdown
        .iter()
        .map(|(kind, &count)| ErrorShare {
            kind: kind.clone(),
            label: error_label(kind),
            count,
            share: if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            },
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.kind.cmp(&b.kind)));
    shares
}

/// "Showing X to Y of Z results", or the empty-state message.
pub fn pagination_summary(response: &QuarantineResponse) -> String {
    match response.display_range() {
        Some((first, last)) => format!(
            "Showing {} to {} of {} results",
            format_number(first),
            format_number(last),
            format_number(response.total)
        ),
        None => EMPTY_RECORDS_MESSAGE.to_string(),
    }
}

/// Distance between `then` and `now` in words, e.g. `"5 minutes ago"`.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    let distance = describe_distance(seconds.unsigned_abs());
    if seconds < 0 {
        format!("in {}", distance)
    } else {
        format!("{} ago", distance)
    }
}

fn describe_distance(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    const MONTH: u64 = 30 * DAY;
    const YEAR: u64 = 365 * DAY;

    // Buckets round to the nearest unit.
    let minutes = (seconds + MINUTE / 2) / MINUTE;
    match seconds {
        s if s < 30 => "less than a minute".to_string(),
        s if s < 90 => "1 minute".to_string(),
        s if s < 45 * MINUTE => format!("{} minutes", minutes),
        s if s < 90 * MINUTE => "about 1 hour".to_string(),
        s if s < DAY => format!("about {} hours", (s + HOUR / 2) / HOUR),
        s if s < 42 * HOUR => "1 day".to_string(),
        s if s < MONTH => format!("{} days", (s + DAY / 2) / DAY),
        s if s < 45 * DAY => "about 1 month".to_string(),
        s if s < 60 * DAY => "about 2 months".to_string(),
        s if s < YEAR => format!("{} months", (s + MONTH / 2) / MONTH),
        s => match (s + YEAR / 2) / YEAR {
            1 => "about 1 year".to_string(),
            n => format!("about {} years", n),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Duration;

    use super::*;

    #[test]
    fn test_scenario_percentages() {
        let metrics = SystemMetrics {
            total_processed: 1000,
            total_valid: 950,
            total_invalid: 50,
            validation_rate: 0.95,
            throughput: 120.0,
            error_breakdown: BTreeMap::new(),
        };
        assert_eq!(format_percentage(metrics.valid_percentage()), "95.00");
        assert_eq!(format_percentage(metrics.invalid_percentage()), "5.00");
        assert_eq!(format_percentage(SystemMetrics::default().valid_percentage()), "0.00");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(12222), "12,222");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_throughput() {
        assert_eq!(format_throughput(120.0), "120.0/s");
        assert_eq!(format_throughput(1234.56), "1,234.6/s");
        assert_eq!(format_throughput(f64::NAN), "0.0/s");
    }

    #[test]
    fn test_error_label_replaces_first_underscore_only() {
        assert_eq!(error_label("schema_violation"), "schema violation");
        assert_eq!(error_label("missing_required_field"), "missing required_field");
        assert_eq!(error_label("timeout"), "timeout");
    }

    #[test]
    fn test_error_shares_sorted_and_summed() {
        let metrics = SystemMetrics {
            error_breakdown: BTreeMap::from([
                ("missing_field".to_string(), 20),
                ("schema_violation".to_string(), 30),
                ("invalid_format".to_string(), 0),
            ]),
            ..Default::default()
        };
        let shares = error_shares(&metrics);

        let kinds: Vec<&str> = shares.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, vec!["schema_violation", "missing_field", "invalid_format"]);
        assert_eq!(shares[0].share, 60.0);
        assert_eq!(shares[1].share, 40.0);
        assert_eq!(shares[2].share, 0.0);
        assert_eq!(shares[0].label, "schema violation");
    }

    #[test]
    fn test_error_shares_empty_breakdown() {
        assert!(error_shares(&SystemMetrics::default()).is_empty());
    }

    fn page(page: u32, rows: usize, total: u64) -> QuarantineResponse {
        let body = serde_json::json!({
            "items": (0..rows).map(|i| serde_json::json!({
                "id": format!("rec-{}", i),
                "topic": "raw-events",
                "partition": 0,
                "offset": i,
                "timestamp": "2024-05-01T10:00:00Z",
                "error_type": "schema_violation",
                "error_message": "Missing required field: user_id",
                "schema_name": "user_event",
                "schema_version": "1.0.0",
                "meta_data": {},
                "created_at": "2024-05-01T10:00:01Z"
            })).collect::<Vec<_>>(),
            "total": total,
            "page": page,
            "page_size": 10
        });
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_pagination_summary() {
        assert_eq!(
            pagination_summary(&page(1, 10, 12222)),
            "Showing 1 to 10 of 12,222 results"
        );
        assert_eq!(
            pagination_summary(&page(3, 4, 24)),
            "Showing 21 to 24 of 24 results"
        );
        assert_eq!(
            pagination_summary(&QuarantineResponse::empty(1, 10)),
            EMPTY_RECORDS_MESSAGE
        );
    }

    #[test]
    fn test_relative_time() {
        let now = Utc::now();
        assert_eq!(relative_time(now - Duration::seconds(10), now), "less than a minute ago");
        assert_eq!(relative_time(now - Duration::seconds(60), now), "1 minute ago");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(relative_time(now - Duration::minutes(60), now), "about 1 hour ago");
        assert_eq!(relative_time(now - Duration::hours(3), now), "about 3 hours ago");
        assert_eq!(relative_time(now - Duration::hours(30), now), "1 day ago");
        assert_eq!(relative_time(now - Duration::days(4), now), "4 days ago");
        assert_eq!(relative_time(now - Duration::days(400), now), "about 1 year ago");
        assert_eq!(relative_time(now + Duration::minutes(5), now), "in 5 minutes");
    }
}
