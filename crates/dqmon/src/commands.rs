use clap::ArgMatches;
use tracing::error;

use dqmon_core::events;

mod helpers;
mod json_types;

mod health;
mod metrics;
mod record;
mod records;
mod tail;

pub async fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let result = match matches.subcommand() {
        Some(("metrics", sub_matches)) => metrics::handle_metrics_command(sub_matches).await,
        Some(("records", sub_matches)) => records::handle_records_command(sub_matches).await,
        Some(("record", sub_matches)) => record::handle_record_command(sub_matches).await,
        Some(("tail", sub_matches)) => tail::handle_tail_command(sub_matches).await,
        Some(("health", sub_matches)) => health::handle_health_command(sub_matches).await,
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    if let Err(e) = &result {
        events::log_app_error(e.as_ref());
    }
    events::log_app_shutdown();
    result
}
