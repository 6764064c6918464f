//! parcopy CLI entry point.
//!
//! Copies a directory tree into an existing destination with one worker
//! thread per queue, showing progress until the workers finish or Ctrl-C
//! cancels the run.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod args;
mod output;
mod progress;
mod settings;
mod shutdown;

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use clap::Parser;

use args::Args;
use parcopy_config::load_config;
use parcopy_copy::{
    CopyEngine, PlanSummary, QueueLocation, RunLogger, StructureOutcome, is_enough_space,
};
use progress::ProgressManager;
use settings::Settings;

/// Exit code when some files could not be copied.
const EXIT_COPY_ERRORS: i32 = 2;

/// Exit code when the run was interrupted.
const EXIT_CANCELLED: i32 = 130;

fn main() {
    let args = Args::parse();

    // Set up logging
    if args.verbose {
        // SAFETY: We're setting this before any other threads are spawned
        unsafe {
            env::set_var("RUST_LOG", "debug");
        }
    }
    pretty_env_logger::init();

    match run(&args) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

/// Main application logic. Returns the process exit code.
fn run(args: &Args) -> Result<i32, Box<dyn std::error::Error>> {
    let loaded = load_config(args.config.as_deref())?;
    let settings = Settings::resolve(args, &loaded.config, num_cpus::get());
    log::debug!("Effective settings: {settings:?}");

    output::print_header("parcopy");
    if let Some(path) = &loaded.config_path {
        output::print_config_source(path);
    }
    output::print_paths(&args.origin, &args.destination, settings.concurrency);
    println!();

    if is_empty_dir(&args.origin) {
        output::print_warning(&format!(
            "Origin {} is empty, only the queues will be created",
            args.origin.display()
        ));
    }

    if let Err(e) = shutdown::install_handler() {
        log::warn!("Cannot install Ctrl-C handler: {e}");
    }

    let engine = CopyEngine::new(
        QueueLocation::new(&settings.queue_dir),
        Arc::new(RunLogger::new(&settings.log_file)),
    );

    let started = Instant::now();
    let plan = engine.create_queues(&args.origin, &args.destination, settings.concurrency)?;

    let progress = ProgressManager::new(settings.show_progress, plan.scope_size);
    progress.print_step(
        "Planned",
        &format!(
            "{} files, {}",
            plan.file_num,
            output::format_mib(plan.scope_size)
        ),
    );
    if plan.skipped > 0 {
        output::print_warning(&format!(
            "{} entries could not be read and were left out",
            plan.skipped
        ));
    }

    let result = copy_planned(
        &engine,
        args,
        &settings,
        &plan,
        &progress,
        &shutdown::is_shutdown_requested,
    );

    progress.clear();
    engine.remove_queues(settings.concurrency);
    result?;

    let snapshot = engine.state().snapshot();
    output::print_summary(&snapshot, started.elapsed());

    if snapshot.error {
        output::print_warning(&format!(
            "Some files were not copied, see {}",
            engine.logger().path().display()
        ));
    }

    Ok(if snapshot.cancelled {
        EXIT_CANCELLED
    } else if snapshot.error {
        EXIT_COPY_ERRORS
    } else {
        0
    })
}

/// Space check, directory replication and the worker phase of a planned run.
///
/// `interrupted` is polled after planning, after replication and while the
/// workers run. Once it returns `true` the run is cancelled.
fn copy_planned(
    engine: &CopyEngine,
    args: &Args,
    settings: &Settings,
    plan: &PlanSummary,
    progress: &ProgressManager,
    interrupted: &impl Fn() -> bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if cancel_if_interrupted(engine, progress, interrupted) {
        return Ok(());
    }

    if settings.check_space && !is_enough_space(&args.destination, plan.scope_size) {
        return Err(format!(
            "Not enough free space at {} for {}",
            args.destination.display(),
            output::format_mib(plan.scope_size)
        )
        .into());
    }

    match engine.copy_dir_structure() {
        StructureOutcome::Replicated { directories } => {
            progress.print_step("Directories", &format!("{directories} replicated"));
        }
        outcome => {
            return Err(format!(
                "Directory structure was not replicated ({outcome:?}), see {}",
                engine.logger().path().display()
            )
            .into());
        }
    }

    if cancel_if_interrupted(engine, progress, interrupted) {
        return Ok(());
    }

    if plan.file_num == 0 {
        log::debug!("Nothing to copy, skipping workers");
        return Ok(());
    }

    let workers = engine.spawn_workers(settings.concurrency)?;
    while !workers.is_finished() {
        cancel_if_interrupted(engine, progress, interrupted);
        progress.update(&engine.state().snapshot());
        thread::sleep(settings.poll_interval);
    }

    let outcome = workers.join();
    progress.update(&engine.state().snapshot());

    if outcome.panicked > 0 {
        output::print_warning(&format!("{} workers panicked", outcome.panicked));
    }
    let skipped: u64 = outcome.reports.iter().map(|r| r.skipped).sum();
    if skipped > 0 {
        output::print_warning(&format!(
            "{skipped} files disappeared or changed type and were skipped"
        ));
    }

    Ok(())
}

/// Cancel the run once `interrupted` reports a shutdown request. Returns
/// whether the run is cancelled.
fn cancel_if_interrupted(
    engine: &CopyEngine,
    progress: &ProgressManager,
    interrupted: &impl Fn() -> bool,
) -> bool {
    if engine.state().is_cancelled() {
        return true;
    }
    if !interrupted() {
        return false;
    }
    engine.state().cancel();
    progress.print_step("Cancelling", "workers stop after their current file");
    true
}

/// Whether `path` is a readable directory without entries.
fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_none())
}
