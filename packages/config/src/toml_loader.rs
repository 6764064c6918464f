//! TOML configuration file loader.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::types::Config;

/// Load a TOML configuration file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// * If the file cannot be read
/// * If the file cannot be parsed as TOML
/// * If `concurrency` or `pollIntervalMs` is zero
pub fn load_toml_config(path: &Path) -> Result<Config, ConfigError> {
    log::debug!("Loading TOML config from {}", path.display());

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    if config.concurrency == Some(0) {
        return Err(ConfigError::InvalidValue {
            path: path.to_path_buf(),
            message: "concurrency must be at least 1".to_string(),
        });
    }
    if config.poll_interval_ms == 0 {
        return Err(ConfigError::InvalidValue {
            path: path.to_path_buf(),
            message: "pollIntervalMs must be at least 1".to_string(),
        });
    }

    log::debug!("Loaded config: {config:?}");

    Ok(config)
}
