//! CLI argument definitions.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use clap::Parser;

/// CLI arguments for parcopy.
#[derive(Debug, Parser)]
#[command(
    name = "parcopy",
    about = "Copy a directory tree in parallel through persisted work queues",
    version
)]
pub struct Args {
    /// Directory to copy from.
    #[arg(index = 1)]
    pub origin: PathBuf,

    /// Existing directory to copy into.
    #[arg(index = 2)]
    pub destination: PathBuf,

    /// Number of queues and worker threads (defaults to the CPU count).
    #[arg(long, short = 'j', value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: Option<u32>,

    /// Config file to use instead of the per-user one.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Directory for queue files.
    #[arg(long)]
    pub queue_dir: Option<PathBuf>,

    /// Run log file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Skip the free space check on the destination.
    #[arg(long = "no-space-check")]
    pub no_space_check: bool,

    /// Disable progress bars (useful for CI environments).
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Enable verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Args {
    /// Determine if we should show progress bars.
    #[must_use]
    pub const fn should_show_progress(&self) -> bool {
        !self.no_progress
    }
}
