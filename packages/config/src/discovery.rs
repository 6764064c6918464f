//! Configuration file discovery.
//!
//! An explicit `--config` path wins. Otherwise the per-user file at
//! `<config dir>/parcopy/config.toml` is used when it exists.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "parcopy";

/// Config file name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The per-user config path, whether or not it exists.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Find the config file to load.
///
/// # Arguments
///
/// * `explicit` - Path given on the command line, if any
/// * `fallback` - Path to use when no explicit path is given
///
/// # Errors
///
/// * If `explicit` is given but does not exist
pub fn discover_config(
    explicit: Option<&Path>,
    fallback: Option<&Path>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        log::debug!("Using config from command line: {}", path.display());
        return Ok(Some(path.to_path_buf()));
    }

    match fallback {
        Some(path) if path.is_file() => {
            log::debug!("Using config: {}", path.display());
            Ok(Some(path.to_path_buf()))
        }
        Some(path) => {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(None)
        }
        None => Ok(None),
    }
}
