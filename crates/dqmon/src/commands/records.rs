use clap::ArgMatches;
use tracing::{info, warn};

use dqmon_core::RecordFilters;
use dqmon_core::format::{EMPTY_RECORDS_MESSAGE, pagination_summary};
use dqmon_core::records::{ALL_ERROR_TYPES, ALL_TOPICS};

use super::helpers::build_context;
use super::json_types::RecordsOutput;
use crate::table::RecordTable;

pub(crate) async fn handle_records_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let json_output = matches.get_flag("json");
    let page = matches.get_one::<u32>("page").copied().unwrap_or(1);
    let topic = matches
        .get_one::<String>("topic")
        .map(String::as_str)
        .unwrap_or(ALL_TOPICS);
    let error_type = matches
        .get_one::<String>("error-type")
        .map(String::as_str)
        .unwrap_or(ALL_ERROR_TYPES);
    let search = matches
        .get_one::<String>("search")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    let ctx = build_context(matches)?;
    let page_size = matches
        .get_one::<u32>("page-size")
        .copied()
        .unwrap_or_else(|| ctx.config().records.page_size());
    let filters = RecordFilters::from_selections(topic, error_type);

    info!(
        event = "cli.records_started",
        page = page,
        page_size = page_size,
        filtered = !filters.is_unfiltered(),
        json_output = json_output
    );

    let lister = ctx.record_lister();
    let response = lister.fetch_page(page, page_size, &filters).await;
    let fetch_error = lister.state().last_error;

    let items = match search {
        Some(needle) => response.search(needle),
        None => response.items.iter().collect(),
    };

    if let Some(e) = &fetch_error {
        warn!(event = "cli.records_showing_empty", error = %e);
    }

    if json_output {
        let output = RecordsOutput::new(
            &response,
            items,
            search,
            fetch_error.map(|e| e.to_string()),
        );
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if let Some(e) = &fetch_error {
            eprintln!("Warning: Could not fetch records ({}).", e);
        }

        if response.is_empty() {
            println!("{}", EMPTY_RECORDS_MESSAGE);
        } else if items.is_empty() {
            println!(
                "No records on this page match '{}'.",
                search.unwrap_or_default()
            );
        } else {
            RecordTable::new(&items).print_table(&items, chrono::Utc::now());
        }

        if !response.is_empty() {
            println!("{}", pagination_summary(&response));
            println!("Page {} of {}", response.page, response.total_pages());
        }
    }

    info!(
        event = "cli.records_completed",
        items = response.items.len(),
        total = response.total
    );
    Ok(())
}
