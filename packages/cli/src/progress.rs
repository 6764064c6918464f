//! Progress bar for a running copy.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::io::Write;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parcopy_copy::RunProgress;

const BAR_TEMPLATE: &str =
    "  Copying [{bar:30.green/dim}] {bytes}/{total_bytes} {msg} ({elapsed_precise})";

/// Byte-based progress bar fed from [`RunProgress`] snapshots.
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a progress bar for `total_bytes`.
    ///
    /// If progress is disabled, the bar is hidden.
    #[must_use]
    pub fn new(enabled: bool, total_bytes: u64) -> Self {
        if !enabled {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("━━─"));

        let bar = ProgressBar::new(total_bytes);
        bar.set_style(style);
        Self { bar }
    }

    /// Move the bar to `progress`.
    pub fn update(&self, progress: &RunProgress) {
        self.bar.set_position(progress.copied_bytes.min(progress.scope_size));
        self.bar
            .set_message(format!("{}/{} files", progress.copied_files, progress.file_num));
    }

    /// Print a completed step line.
    pub fn print_step(&self, label: &str, result: &str) {
        self.bar.suspend(|| {
            println!("{} {:<24} {}", "✓".green(), label, result.dimmed());
            let _ = std::io::stdout().flush();
        });
    }

    /// Remove the bar from the terminal.
    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}
