//! Configuration types for parcopy.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default progress poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30;

const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

const fn default_check_space() -> bool {
    true
}

/// parcopy configuration.
///
/// Every field is optional in the file; command-line flags override it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Number of queues and worker threads. Defaults to the CPU count.
    #[serde(default)]
    pub concurrency: Option<u32>,

    /// Directory for queue files. Defaults to the system temp directory.
    #[serde(default)]
    pub queue_dir: Option<PathBuf>,

    /// Run log file. Defaults to `parcopy_log.txt` in the queue directory.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// How often progress is polled while workers run.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Whether to refuse runs that do not fit on the destination volume.
    #[serde(default = "default_check_space")]
    pub check_space: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: None,
            queue_dir: None,
            log_file: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            check_space: true,
        }
    }
}

/// A loaded configuration with metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// The parsed configuration.
    pub config: Config,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
}
