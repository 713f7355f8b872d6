use std::time::Duration;

use clap::ArgMatches;
use tracing::{info, warn};

use dqmon_core::PollerStatus;
use dqmon_core::format::{
    error_shares, format_number, format_percentage, format_throughput, relative_time,
};

use super::helpers::build_context;
use super::json_types::MetricsOutput;

pub(crate) async fn handle_metrics_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let watch = matches.get_flag("watch");
    let count = matches.get_one::<u64>("count").copied();

    let ctx = build_context(matches)?;
    let interval = matches
        .get_one::<u64>("interval")
        .map(|ms| Duration::from_millis(*ms))
        .unwrap_or_else(|| ctx.config().metrics.poll_interval());

    info!(
        event = "cli.metrics_started",
        watch = watch,
        json_output = json_output,
        interval_ms = interval.as_millis() as u64
    );

    let poller = ctx.metrics_poller();

    if !watch {
        poller.refresh().await;
        print_metrics(&poller.status(), json_output, true)?;
        info!(event = "cli.metrics_completed");
        return Ok(());
    }

    let mut updates = poller.subscribe();
    poller.start(interval);

    // Failed polls leave the snapshot untouched, so the ticker re-renders
    // while the backend is unreachable.
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut rendered: u64 = 0;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!(event = "cli.metrics_interrupted");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = ticker.tick() => {
                if !poller.status().has_error() {
                    continue;
                }
            }
        }

        print_metrics(&poller.status(), json_output, false)?;
        rendered += 1;
        if count.is_some_and(|limit| rendered >= limit) {
            break;
        }
    }

    poller.stop();
    ctx.shutdown();
    info!(event = "cli.metrics_completed", updates = rendered);
    Ok(())
}

fn print_metrics(
    status: &PollerStatus,
    json_output: bool,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(e) = &status.error {
        warn!(event = "cli.metrics_showing_fallback", error = %e);
        if !json_output {
            eprintln!(
                "Warning: Could not fetch metrics ({}). Showing last known values.",
                e
            );
        }
    }

    if json_output {
        let output = MetricsOutput::from_status(status);
        if pretty {
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string(&output)?);
        }
        return Ok(());
    }

    let metrics = status.snapshot.as_ref();
    let updated = status
        .last_success
        .map(|at| relative_time(at, chrono::Utc::now()))
        .unwrap_or_else(|| "never".to_string());

    println!("Pipeline metrics (updated {})", updated);
    println!("  Total processed:  {}", format_number(metrics.total_processed));
    println!(
        "  Valid:            {} ({}%)",
        format_number(metrics.total_valid),
        format_percentage(metrics.valid_percentage())
    );
    println!(
        "  Invalid:          {} ({}%)",
        format_number(metrics.total_invalid),
        format_percentage(metrics.invalid_percentage())
    );
    println!("  Validation rate:  {}", metrics.validation_rate);
    println!("  Throughput:       {}", format_throughput(metrics.throughput));

    let shares = error_shares(metrics);
    if !shares.is_empty() {
        println!();
        println!(
            "Error distribution ({} total)",
            format_number(metrics.total_errors())
        );
        let label_width = shares
            .iter()
            .map(|s| s.label.chars().count())
            .max()
            .unwrap_or(0);
        for share in &shares {
            println!(
                "  {:<width$}  {:>8}  {:>6}%",
                share.label,
                format_number(share.count),
                format_percentage(share.share),
                width = label_width
            );
        }
    }
    println!();

    Ok(())
}
