use clap::ArgMatches;
use tracing::{error, warn};

use dqmon_core::{DashboardContext, DqmonConfig, DqmonError};

/// Load configuration with warning on errors.
///
/// Falls back to defaults so a broken config file never blocks a read-only
/// dashboard command.
pub(crate) fn load_config_with_warning() -> DqmonConfig {
    match DqmonConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.dqmon/config.toml and ./.dqmon/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                "Config load failed, using defaults"
            );
            DqmonConfig::default()
        }
    }
}

/// Build the dashboard context, applying `--backend-url` on top of config.
pub(crate) fn build_context(matches: &ArgMatches) -> Result<DashboardContext, Box<dyn std::error::Error>> {
    let mut config = load_config_with_warning();
    if let Some(url) = matches.get_one::<String>("backend-url") {
        config.backend.base_url = Some(url.clone());
    }

    DashboardContext::new(config).map_err(|e| {
        eprintln!("Error: {}", e);
        error!(
            event = "cli.context.build_failed",
            error = %e,
            error_code = e.error_code()
        );
        e.to_string().into()
    })
}
