//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.dqmon/config.toml` (global user preferences)
//! 3. **Project config** - `./.dqmon/config.toml` (project-specific overrides)
//! 4. **Environment** - `DQMON_BACKEND_URL`
//! 5. **CLI arguments** - Command-line flags (highest priority, applied by the CLI)

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::defaults::BACKEND_URL_ENV;
use crate::config::types::{BackendConfig, DqmonConfig, LiveConfig, MetricsConfig, RecordsConfig};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be parsed, or if the
/// merged configuration fails validation. Missing config files are not errors.
pub fn load_hierarchy() -> Result<DqmonConfig, ConfigError> {
    let user_path = user_config_path();
    let project_path = std::env::current_dir()?.join(".dqmon").join("config.toml");

    let mut config = load_from_paths(user_path.as_deref(), Some(&project_path))?;
    apply_env_overrides(&mut config, std::env::var(BACKEND_URL_ENV).ok());

    validate_config(&config)?;
    Ok(config)
}

/// Load and merge the given config files, skipping files that do not exist.
///
/// Does not validate; callers validate after all overrides are applied.
pub fn load_from_paths(
    user_path: Option<&Path>,
    project_path: Option<&Path>,
) -> Result<DqmonConfig, ConfigError> {
    let mut config = DqmonConfig::default();

    for path in [user_path, project_path].into_iter().flatten() {
        match load_config_file(path) {
            Ok(file_config) => {
                debug!(event = "core.config.file_loaded", path = %path.display());
                config = merge_configs(config, file_config);
            }
            Err(ConfigError::ConfigNotFound { .. }) => {}
            Err(e) => return Err(e),
        }
    }

    Ok(config)
}

/// Apply environment overrides on top of file configuration.
///
/// Empty values are ignored.
pub fn apply_env_overrides(config: &mut DqmonConfig, backend_url: Option<String>) {
    if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
        config.backend.base_url = Some(url);
    }
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<DqmonConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Default location of the user config file, if a home directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".dqmon").join("config.toml"))
}

/// Merge two configurations, with override_config taking precedence.
///
/// Override values replace base values only if present.
pub fn merge_configs(base: DqmonConfig, override_config: DqmonConfig) -> DqmonConfig {
    DqmonConfig {
        backend: BackendConfig {
            base_url: override_config.backend.base_url.or(base.backend.base_url),
            timeout_ms: override_config.backend.timeout_ms.or(base.backend.timeout_ms),
        },
        metrics: MetricsConfig {
            poll_interval_ms: override_config
                .metrics
                .poll_interval_ms
                .or(base.metrics.poll_interval_ms),
        },
        records: RecordsConfig {
            page_size: override_config.records.page_size.or(base.records.page_size),
        },
        live: LiveConfig {
            interval_ms: override_config.live.interval_ms.or(base.live.interval_ms),
            capacity: override_config.live.capacity.or(base.live.capacity),
            error_probability: override_config
                .live
                .error_probability
                .or(base.live.error_probability),
            stream: override_config.live.stream.or(base.live.stream),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from_paths(
            Some(&dir.path().join("nope.toml")),
            Some(&dir.path().join("also-nope.toml")),
        )
        .unwrap();
        assert_eq!(config, DqmonConfig::default());
    }

    #[test]
    fn test_project_overrides_user() {
        let dir = tempfile::tempdir().unwrap();
        let user = write(
            dir.path(),
            "user.toml",
            r#"
[backend]
base_url = "http://user:8080"
timeout_ms = 2000

[live]
capacity = 20
"#,
        );
        let project = write(
            dir.path(),
            "project.toml",
            r#"
[backend]
base_url = "http://project:9090"

[records]
page_size = 25
"#,
        );

        let config = load_from_paths(Some(&user), Some(&project)).unwrap();
        assert_eq!(config.backend.base_url(), "http://project:9090");
        assert_eq!(config.backend.timeout_ms, Some(2000));
        assert_eq!(config.records.page_size(), 25);
        assert_eq!(config.live.capacity(), 20);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write(dir.path(), "broken.toml", "[backend\nbase_url = 1");

        let err = load_from_paths(Some(&broken), None).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn test_env_override_replaces_file_url() {
        let mut config = DqmonConfig::default();
        config.backend.base_url = Some("http://file:1".to_string());

        apply_env_overrides(&mut config, Some("http://env:2".to_string()));
        assert_eq!(config.backend.base_url(), "http://env:2");

        apply_env_overrides(&mut config, Some("  ".to_string()));
        assert_eq!(config.backend.base_url(), "http://env:2");

        apply_env_overrides(&mut config, None);
        assert_eq!(config.backend.base_url(), "http://env:2");
    }

    #[test]
    fn test_merge_keeps_base_when_override_empty() {
        let base = DqmonConfig {
            metrics: MetricsConfig {
                poll_interval_ms: Some(1000),
            },
            ..Default::default()
        };
        let merged = merge_configs(base, DqmonConfig::default());
        assert_eq!(merged.metrics.poll_interval_ms, Some(1000));
    }
}
