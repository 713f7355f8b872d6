use clap::ArgMatches;
use tracing::{error, info};

use super::helpers::build_context;
use super::json_types::HealthOutput;

pub(crate) async fn handle_health_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let ctx = build_context(matches)?;
    let backend_url = ctx.client().base_url();

    info!(event = "cli.health_started", backend_url = backend_url);

    let health = match ctx.client().health().await {
        Ok(health) => health,
        Err(e) => {
            eprintln!("Backend at {} is unreachable: {}", backend_url, e);
            error!(event = "cli.health_failed", error = %e, error_kind = e.kind());
            return Err(e.into());
        }
    };

    if json_output {
        let output = HealthOutput {
            backend_url,
            status: &health.status,
            version: &health.version,
            healthy: health.is_healthy(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Backend at {} is {} (version {})",
            backend_url, health.status, health.version
        );
    }

    info!(
        event = "cli.health_completed",
        status = %health.status,
        healthy = health.is_healthy()
    );
    Ok(())
}
