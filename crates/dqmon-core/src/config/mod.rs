//! # Configuration System
//!
//! Hierarchical TOML configuration for dqmon.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.dqmon/config.toml`
//! 3. **Project config** - `./.dqmon/config.toml`
//! 4. **Environment** - `DQMON_BACKEND_URL`
//! 5. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use dqmon_core::config::DqmonConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DqmonConfig::load_hierarchy()?;
//!     println!("polling {}", config.backend.base_url());
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{BackendConfig, DqmonConfig, LiveConfig, MetricsConfig, RecordsConfig};
pub use validation::validate_config;

impl DqmonConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
