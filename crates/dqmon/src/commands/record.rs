use clap::ArgMatches;
use tracing::{error, info};

use dqmon_core::FetchError;
use dqmon_core::format::{error_label, relative_time};

use super::helpers::build_context;

pub(crate) async fn handle_record_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let id = matches
        .get_one::<String>("id")
        .ok_or("Record id is required")?;

    let ctx = build_context(matches)?;
    info!(event = "cli.record_started", id = %id);

    let record = match ctx.record_lister().fetch_record(id).await {
        Ok(record) => record,
        Err(FetchError::NotFound { .. }) => {
            eprintln!("Record '{}' not found", id);
            error!(event = "cli.record_not_found", id = %id);
            return Err(format!("Record '{}' not found", id).into());
        }
        Err(e) => {
            eprintln!("Failed to fetch record '{}': {}", id, e);
            error!(event = "cli.record_failed", id = %id, error = %e);
            return Err(e.into());
        }
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        let created = record
            .created_at_utc()
            .map(|at| format!("{} ({})", record.created_at, relative_time(at, chrono::Utc::now())))
            .unwrap_or_else(|| record.created_at.clone());

        println!("Record:     {}", record.id);
        println!("Topic:      {}", record.topic);
        println!("Partition:  {}", record.partition);
        println!("Offset:     {}", record.offset);
        println!("Timestamp:  {}", record.timestamp);
        if let Some(key) = &record.key {
            println!("Key:        {}", key);
        }
        println!("Error type: {}", error_label(&record.error_type));
        println!("Error:      {}", record.error_message);
        println!("Schema:     {} v{}", record.schema_name, record.schema_version);
        println!("Created:    {}", created);
        if !record.metadata.is_null() {
            println!("Metadata:   {}", record.metadata);
        }
        if let Some(value) = &record.value {
            println!("Payload:");
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }

    info!(event = "cli.record_completed", id = %id);
    Ok(())
}
