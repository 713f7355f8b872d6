use clap::{Arg, ArgAction, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("dqmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Watch data-quarantine metrics, records and the live event stream")
        .long_about("dqmon is a terminal dashboard for a data-quarantine pipeline. It polls the backend for aggregate validation metrics, lists quarantined records page by page, and tails a live stream of pipeline log entries.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("backend-url")
                .long("backend-url")
                .help("Backend base URL (overrides config and DQMON_BACKEND_URL)")
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("metrics")
                .about("Show aggregate validation metrics")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format (one object per line with --watch)")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("watch")
                        .long("watch")
                        .short('w')
                        .help("Keep polling and print every update until interrupted")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .help("Poll interval in milliseconds (overrides config, default: 5000)")
                        .value_parser(value_parser!(u64).range(1..))
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .short('n')
                        .help("Stop watching after this many updates")
                        .value_parser(value_parser!(u64).range(1..))
                        .requires("watch")
                )
        )
        .subcommand(
            Command::new("records")
                .about("List quarantined records")
                .arg(
                    Arg::new("page")
                        .long("page")
                        .short('p')
                        .help("1-based page number")
                        .value_parser(value_parser!(u32).range(1..))
                        .default_value("1")
                )
                .arg(
                    Arg::new("page-size")
                        .long("page-size")
                        .help("Records per page, 1 to 100 (overrides config, default: 10)")
                        .value_parser(value_parser!(u32).range(1..=100))
                )
                .arg(
                    Arg::new("topic")
                        .long("topic")
                        .short('t')
                        .help("Only records from this topic")
                        .default_value(dqmon_core::records::ALL_TOPICS)
                )
                .arg(
                    Arg::new("error-type")
                        .long("error-type")
                        .short('e')
                        .help("Only records with this error type")
                        .default_value(dqmon_core::records::ALL_ERROR_TYPES)
                )
                .arg(
                    Arg::new("search")
                        .long("search")
                        .short('s')
                        .help("Narrow the fetched page by id, error, or schema")
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("record")
                .about("Show one quarantined record")
                .arg(
                    Arg::new("id")
                        .help("Record id")
                        .required(true)
                        .index(1)
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("tail")
                .about("Tail the live pipeline log stream")
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .help("Milliseconds between entries (overrides config, default: 800)")
                        .value_parser(value_parser!(u64).range(1..))
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .short('n')
                        .help("Stop after this many entries")
                        .value_parser(value_parser!(u64).range(1..))
                )
                .arg(
                    Arg::new("error-rate")
                        .long("error-rate")
                        .help("Probability of an ERROR entry, 0.0 to 1.0 (overrides config, default: 0.3)")
                        .value_parser(parse_probability)
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for a reproducible simulated stream")
                        .value_parser(value_parser!(u64))
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output one JSON object per entry")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("health")
                .about("Check that the backend is reachable")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue)
                )
        )
}

fn parse_probability(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("must be between 0.0 and 1.0, got {}", value))
    }
}
