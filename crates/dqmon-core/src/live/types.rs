use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    pub partition: u32,
    pub offset: u64,
}

/// One line of the live monitor stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveLogEntry {
    /// Locally unique, increasing within one source.
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub level: LogLevel,
    pub source: String,
    pub message: String,
    pub metadata: EntryMetadata,
}

impl LiveLogEntry {
    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    /// Never started.
    Idle,
    Live,
    /// Stopped or paused; the buffer is kept.
    Paused,
    /// The source has no more entries.
    Exhausted,
}

impl FeedStatus {
    /// Header label for the live monitor.
    pub fn label(&self) -> &'static str {
        match self {
            FeedStatus::Live => "Live",
            FeedStatus::Idle | FeedStatus::Paused => "Paused",
            FeedStatus::Exhausted => "Ended",
        }
    }
}

/// Level counts over the buffered entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    pub info: usize,
    pub error: usize,
}

impl FeedStats {
    pub fn total(&self) -> usize {
        self.info + self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_wire_shape() {
        let entry = LiveLogEntry {
            id: 7,
            timestamp: DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            level: LogLevel::Error,
            source: "kafka-consumer-error".to_string(),
            message: "Validation failed".to_string(),
            metadata: EntryMetadata {
                partition: 2,
                offset: 100007,
            },
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "ERROR");
        assert_eq!(json["metadata"]["offset"], 100007);
        assert!(entry.is_error());
    }

    #[test]
    fn test_level_display_honors_width() {
        assert_eq!(format!("{:<5}|", LogLevel::Info), "INFO |");
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(FeedStatus::Live.label(), "Live");
        assert_eq!(FeedStatus::Paused.label(), "Paused");
        assert_eq!(FeedStatus::Exhausted.label(), "Ended");
    }
}
