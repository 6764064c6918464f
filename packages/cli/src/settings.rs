//! Effective run settings: command-line flags over config file over defaults.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use std::time::Duration;

use parcopy_config::Config;
use parcopy_copy::LOG_FILE_NAME;

use crate::args::Args;

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub concurrency: u32,
    pub queue_dir: PathBuf,
    pub log_file: PathBuf,
    pub poll_interval: Duration,
    pub check_space: bool,
    pub show_progress: bool,
}

impl Settings {
    /// Merge `args` over `config`. `cpus` is the fallback concurrency.
    ///
    /// The log file defaults to [`LOG_FILE_NAME`] inside the queue directory.
    #[must_use]
    pub fn resolve(args: &Args, config: &Config, cpus: usize) -> Self {
        let concurrency = args
            .jobs
            .or(config.concurrency)
            .unwrap_or_else(|| u32::try_from(cpus).unwrap_or(u32::MAX).max(1));

        let queue_dir = args
            .queue_dir
            .clone()
            .or_else(|| config.queue_dir.clone())
            .unwrap_or_else(std::env::temp_dir);

        let log_file = args
            .log_file
            .clone()
            .or_else(|| config.log_file.clone())
            .unwrap_or_else(|| queue_dir.join(LOG_FILE_NAME));

        Self {
            concurrency,
            queue_dir,
            log_file,
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            check_space: config.check_space && !args.no_space_check,
            show_progress: args.should_show_progress(),
        }
    }
}
