use chrono::{DateTime, Utc};
use dqmon_core::QuarantineRecord;
use dqmon_core::format::{error_label, relative_time};

pub struct RecordTable {
    id_width: usize,
    topic_width: usize,
    error_width: usize,
    schema_width: usize,
    created_width: usize,
    message_width: usize,
}

impl RecordTable {
    pub fn new(records: &[&QuarantineRecord]) -> Self {
        let id_width = records
            .iter()
            .map(|r| r.id.chars().count())
            .max()
            .unwrap_or(12)
            .clamp(2, 36); // Between "ID" header and a full UUID

        let topic_width = records
            .iter()
            .map(|r| r.topic.chars().count())
            .max()
            .unwrap_or(10)
            .clamp(5, 24);

        Self {
            id_width,
            topic_width,
            error_width: 16,
            schema_width: 18,
            created_width: 18,
            message_width: 40,
        }
    }

    pub fn print_table(&self, records: &[&QuarantineRecord], now: DateTime<Utc>) {
        println!("{}", self.border('┌', '┬', '┐'));
        println!(
            "{}",
            self.row(["ID", "Topic", "Error Type", "Schema", "Created", "Message"])
        );
        println!("{}", self.border('├', '┼', '┤'));
        for record in records {
            let schema = format!("{} v{}", record.schema_name, record.schema_version);
            let created = record
                .created_at_utc()
                .map(|at| relative_time(at, now))
                .unwrap_or_else(|| record.created_at.clone());
            println!(
                "{}",
                self.row([
                    record.id.as_str(),
                    record.topic.as_str(),
                    error_label(&record.error_type).as_str(),
                    schema.as_str(),
                    created.as_str(),
                    record.error_message.as_str(),
                ])
            );
        }
        println!("{}", self.border('└', '┴', '┘'));
    }

    fn widths(&self) -> [usize; 6] {
        [
            self.id_width,
            self.topic_width,
            self.error_width,
            self.schema_width,
            self.created_width,
            self.message_width,
        ]
    }

    fn row(&self, cells: [&str; 6]) -> String {
        let cells: Vec<String> = cells
            .iter()
            .zip(self.widths())
            .map(|(cell, width)| truncate(cell, width))
            .collect();
        format!("│ {} │", cells.join(" │ "))
    }

    fn border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self.widths().iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(&mid.to_string()), right)
    }
}

/// Truncate a string to a maximum display width, adding "..." if truncated.
///
/// Uses character count (not byte count) to safely handle UTF-8 strings
/// including emoji and multi-byte characters.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_pads_short_values() {
        assert_eq!(truncate("abc", 5), "abc  ");
    }

    #[test]
    fn test_truncate_long_values() {
        assert_eq!(truncate("schema_violation", 10), "schema_...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("ñandú-events", 8), "ñandú...");
    }

    #[test]
    fn test_border_and_row_have_equal_width() {
        let table = RecordTable::new(&[]);
        let border = table.border('┌', '┬', '┐');
        let row = table.row(["ID", "Topic", "Error Type", "Schema", "Created", "Message"]);
        assert_eq!(border.chars().count(), row.chars().count());
    }
}
