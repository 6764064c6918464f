//! Configuration loading for parcopy.
//!
//! Settings live in a TOML file with camelCase keys. Every key is optional.
//!
//! ```toml
//! concurrency = 8
//! queueDir = "/var/tmp/parcopy"
//! logFile = "/var/log/parcopy_log.txt"
//! pollIntervalMs = 30
//! checkSpace = true
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use parcopy_config::load_config;
//!
//! let loaded = load_config(None)?;
//! let jobs = loaded.config.concurrency.unwrap_or(4);
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod discovery;
mod error;
mod toml_loader;
mod types;

pub use discovery::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, default_config_path, discover_config};
pub use error::ConfigError;
pub use toml_loader::load_toml_config;
pub use types::{Config, DEFAULT_POLL_INTERVAL_MS, LoadedConfig};

use std::path::Path;

/// Load the configuration for a run.
///
/// Uses `explicit` when given, otherwise the per-user config file if it
/// exists, otherwise built-in defaults.
///
/// # Errors
///
/// * If `explicit` is given but does not exist
/// * If the chosen file cannot be read or parsed
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let fallback = default_config_path();
    load_config_from(explicit, fallback.as_deref())
}

/// Like [`load_config`] with an explicit fallback location.
///
/// # Errors
///
/// * If `explicit` is given but does not exist
/// * If the chosen file cannot be read or parsed
pub fn load_config_from(
    explicit: Option<&Path>,
    fallback: Option<&Path>,
) -> Result<LoadedConfig, ConfigError> {
    let Some(path) = discover_config(explicit, fallback)? else {
        return Ok(LoadedConfig::default());
    };

    let config = load_toml_config(&path)?;

    Ok(LoadedConfig {
        config,
        config_path: Some(path),
    })
}
