//! Terminal output formatting.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use parcopy_copy::RunProgress;

const MIB: f64 = 1024.0 * 1024.0;

/// Print a header message.
pub fn print_header(message: &str) {
    println!("\n{} {}\n", "📦", message.bold());
}

/// Print the origin and destination of a run.
pub fn print_paths(origin: &Path, destination: &Path, concurrency: u32) {
    println!("From:    {}", origin.display().to_string().cyan());
    println!("To:      {}", destination.display().to_string().cyan());
    println!("Workers: {}", concurrency.to_string().cyan());
}

/// Print the config file in use.
pub fn print_config_source(path: &Path) {
    println!("Config:  {}", path.display().to_string().yellow());
}

/// Format a byte count as MiB with one decimal.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_mib(bytes: u64) -> String {
    format!("{:.1} MiB", bytes as f64 / MIB)
}

/// Summary line for a finished or cancelled run.
#[must_use]
pub fn summary_line(progress: &RunProgress, elapsed: Duration) -> String {
    let verb = if progress.cancelled {
        "Cancelled after copying"
    } else {
        "Copied"
    };
    format!(
        "{verb} {}/{} files ({} of {}) in {:.1}s",
        progress.copied_files,
        progress.file_num,
        format_mib(progress.copied_bytes),
        format_mib(progress.scope_size),
        elapsed.as_secs_f64()
    )
}

/// Print the run summary.
pub fn print_summary(progress: &RunProgress, elapsed: Duration) {
    let line = summary_line(progress, elapsed);
    if progress.cancelled {
        println!("{} {}", "⏹".yellow(), line);
    } else {
        println!("{} {}", "✅", line);
    }
}

/// Print error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "Warning:".yellow().bold(), message);
}
