//! Filter and pagination parameters for record listings.

use serde::{Deserialize, Serialize};

/// UI selection meaning "no topic filter".
pub const ALL_TOPICS: &str = "All Topics";
/// UI selection meaning "no error type filter".
pub const ALL_ERROR_TYPES: &str = "All Error Types";

/// Record filters with the "all" sentinels already resolved.
///
/// `None` means the parameter is omitted from the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilters {
    pub topic: Option<String>,
    pub error_type: Option<String>,
}

impl RecordFilters {
    /// No filtering.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build filters from raw UI selections.
    ///
    /// The sentinel selections and blank values become `None`.
    pub fn from_selections(topic: &str, error_type: &str) -> Self {
        Self {
            topic: selection(topic, ALL_TOPICS),
            error_type: selection(error_type, ALL_ERROR_TYPES),
        }
    }

    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = selection(topic, ALL_TOPICS);
        self
    }

    pub fn with_error_type(mut self, error_type: &str) -> Self {
        self.error_type = selection(error_type, ALL_ERROR_TYPES);
        self
    }

    pub fn is_unfiltered(&self) -> bool {
        let topic = self.topic.as_deref().and_then(|t| selection(t, ALL_TOPICS));
        let error_type = self
            .error_type
            .as_deref()
            .and_then(|e| selection(e, ALL_ERROR_TYPES));
        topic.is_none() && error_type.is_none()
    }
}

fn selection(value: &str, sentinel: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == sentinel {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A single page request: 1-based page, page size and filters.
///
/// Values are passed through unchecked; the backend owns bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub page: u32,
    pub page_size: u32,
    pub filters: RecordFilters,
}

impl RecordQuery {
    pub fn new(page: u32, page_size: u32, filters: RecordFilters) -> Self {
        Self {
            page,
            page_size,
            filters,
        }
    }

    /// Query string pairs in wire order.
    ///
    /// Sentinel and blank filter values are dropped here as well, since
    /// filters built as literals or deserialized never went through
    /// [`RecordFilters::from_selections`].
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        let topic = self.filters.topic.as_deref();
        if let Some(topic) = topic.and_then(|t| selection(t, ALL_TOPICS)) {
            pairs.push(("topic", topic));
        }
        let error_type = self.filters.error_type.as_deref();
        if let Some(error_type) = error_type.and_then(|e| selection(e, ALL_ERROR_TYPES)) {
            pairs.push(("error_type", error_type));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_omitted() {
        let query = RecordQuery::new(
            1,
            10,
            RecordFilters::from_selections(ALL_TOPICS, ALL_ERROR_TYPES),
        );
        assert_eq!(
            query.to_query_pairs(),
            vec![("page", "1".to_string()), ("page_size", "10".to_string())]
        );
        assert!(query.filters.is_unfiltered());
    }

    #[test]
    fn test_literal_and_deserialized_sentinels_are_omitted() {
        let page_only = vec![("page", "1".to_string()), ("page_size", "10".to_string())];

        let literal = RecordFilters {
            topic: Some(ALL_TOPICS.into()),
            error_type: Some(ALL_ERROR_TYPES.into()),
        };
        assert_eq!(
            RecordQuery::new(1, 10, literal).to_query_pairs(),
            page_only
        );

        let deserialized: RecordFilters = serde_json::from_str(
            r#"{"topic":"All Topics","error_type":"All Error Types"}"#,
        )
        .unwrap();
        assert_eq!(
            RecordQuery::new(1, 10, deserialized).to_query_pairs(),
            page_only
        );

        let blank = RecordFilters {
            topic: Some("  ".into()),
            error_type: None,
        };
        assert!(blank.is_unfiltered());
        assert_eq!(RecordQuery::new(1, 10, blank).to_query_pairs(), page_only);
    }

    #[test]
    fn test_blank_selections_are_omitted() {
        let filters = RecordFilters::from_selections("", "   ");
        assert_eq!(filters, RecordFilters::all());
    }

    #[test]
    fn test_concrete_selections_are_sent() {
        let query = RecordQuery::new(
            2,
            25,
            RecordFilters::from_selections("raw-events", "missing_field"),
        );
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("page", "2".to_string()),
                ("page_size", "25".to_string()),
                ("topic", "raw-events".to_string()),
                ("error_type", "missing_field".to_string()),
            ]
        );
    }

    #[test]
    fn test_sentinel_is_exact_match() {
        let filters = RecordFilters::all().with_topic("all topics");
        assert_eq!(filters.topic.as_deref(), Some("all topics"));

        let filters = filters.with_topic(ALL_TOPICS).with_error_type("bad_type");
        assert_eq!(filters.topic, None);
        assert_eq!(filters.error_type.as_deref(), Some("bad_type"));
    }
}
