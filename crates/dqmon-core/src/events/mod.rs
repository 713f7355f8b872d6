//! Structured lifecycle events shared by the library and the CLI.

use tracing::{error, info};

use crate::config::DqmonConfig;

pub fn log_app_startup() {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION")
    );
}

pub fn log_app_shutdown() {
    info!(event = "core.app.shutdown_started");
}

pub fn log_app_error(error: &dyn std::error::Error) {
    error!(
        event = "core.app.error_occurred",
        error = %error,
        error_type = std::any::type_name_of_val(error)
    );
}

/// Record which backend a dashboard session talks to, with the effective
/// polling and paging settings.
pub fn log_dashboard_ready(config: &DqmonConfig, backend_url: &str) {
    info!(
        event = "core.context.created",
        backend_url = backend_url,
        poll_interval_ms = config.metrics.poll_interval().as_millis() as u64,
        page_size = config.records.page_size(),
        live_capacity = config.live.capacity()
    );
}
