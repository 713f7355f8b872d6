use std::time::Duration;

use clap::ArgMatches;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use dqmon_core::{LiveLogEntry, SimulatedLogSource};

use super::helpers::build_context;

pub(crate) async fn handle_tail_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let count = matches.get_one::<u64>("count").copied();

    let ctx = build_context(matches)?;
    let live = &ctx.config().live;
    let interval = matches
        .get_one::<u64>("interval")
        .map(|ms| Duration::from_millis(*ms))
        .unwrap_or_else(|| live.interval());
    let error_rate = matches
        .get_one::<f64>("error-rate")
        .copied()
        .unwrap_or_else(|| live.error_probability());

    let source = match matches.get_one::<u64>("seed") {
        Some(seed) => SimulatedLogSource::with_seed(*seed, error_rate),
        None => SimulatedLogSource::new(error_rate),
    };
    let feed = ctx.live_feed_with(source)?;

    info!(
        event = "cli.tail_started",
        interval_ms = interval.as_millis() as u64,
        error_rate = error_rate,
        capacity = feed.capacity()
    );

    if !json_output {
        println!(
            "Tailing {} every {}ms (Ctrl-C to stop)",
            live.stream(),
            interval.as_millis()
        );
    }

    let mut entries = feed.subscribe();
    feed.start(interval);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut printed: u64 = 0;
    loop {
        let entry = tokio::select! {
            _ = &mut ctrl_c => {
                info!(event = "cli.tail_interrupted");
                break;
            }
            received = entries.recv() => match received {
                Ok(entry) => entry,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(event = "cli.tail_lagged", skipped = skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
        };

        print_entry(&entry, json_output)?;
        printed += 1;
        if count.is_some_and(|limit| printed >= limit) {
            break;
        }
    }

    feed.stop();
    let stats = feed.stats();
    if !json_output {
        println!(
            "{} entries buffered ({} info, {} error)",
            stats.total(),
            stats.info,
            stats.error
        );
    }

    ctx.shutdown();
    info!(event = "cli.tail_completed", printed = printed);
    Ok(())
}

fn print_entry(entry: &LiveLogEntry, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json_output {
        println!("{}", serde_json::to_string(entry)?);
    } else {
        println!(
            "{} {:<5} [{}] p{}@{} {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            entry.level,
            entry.source,
            entry.metadata.partition,
            entry.metadata.offset,
            entry.message
        );
    }
    Ok(())
}
