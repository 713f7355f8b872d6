//! Configuration validation.

use crate::config::defaults::MAX_PAGE_SIZE;
use crate::config::types::DqmonConfig;
use crate::errors::ConfigError;

/// Validate the effective configuration.
///
/// # Errors
///
/// - backend URL that is not http(s)
/// - zero timeout or intervals
/// - page size outside `1..=100`
/// - zero live buffer capacity
/// - error probability outside `[0, 1]`
pub fn validate_config(config: &DqmonConfig) -> Result<(), ConfigError> {
    let url = config.backend.base_url();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidBackendUrl {
            url: url.to_string(),
        });
    }

    if config.backend.timeout().is_zero() {
        return Err(invalid("backend.timeout_ms must be greater than 0"));
    }

    if config.metrics.poll_interval().is_zero() {
        return Err(invalid("metrics.poll_interval_ms must be greater than 0"));
    }

    let page_size = config.records.page_size();
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(invalid(&format!(
            "records.page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, page_size
        )));
    }

    if config.live.interval().is_zero() {
        return Err(invalid("live.interval_ms must be greater than 0"));
    }

    if config.live.capacity() == 0 {
        return Err(invalid("live.capacity must be greater than 0"));
    }

    let p = config.live.error_probability();
    if !(0.0..=1.0).contains(&p) {
        return Err(invalid(&format!(
            "live.error_probability must be between 0 and 1, got {}",
            p
        )));
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::InvalidConfiguration {
        message: message.to_string(),
    }
}
