//! Copy workers: one OS thread per queue.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parcopy_log::RunLogger;
use parcopy_queue::{QueueError, QueueReader};

use crate::copy::{FileCopyOutcome, copy_file};
use crate::engine::{CopyEngine, record};
use crate::progress::RunState;

/// What one worker did with its queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Files copied.
    pub copied: u64,
    /// Files skipped because the source was missing or not a regular file.
    pub skipped: u64,
    /// Files that failed to copy.
    pub failed: u64,
    /// Whether the worker stopped because of cancellation.
    pub cancelled: bool,
}

/// Counts the worker as finished however it exits.
struct FinishGuard<'a>(&'a RunState);

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.0.worker_finished();
    }
}

/// Copy every file listed in the queue at `queue`.
///
/// The cancel flag is checked before each file. Per-file failures set the
/// sticky error flag and are logged; the worker then moves on to the next
/// file. A queue that cannot be opened or has an empty header line is logged
/// and ends the worker.
pub fn run_worker(queue: &Path, state: &RunState, logger: &RunLogger) -> WorkerReport {
    let _finished = FinishGuard(state);
    let mut report = WorkerReport::default();

    let mut reader = match QueueReader::open(queue) {
        Ok(reader) => reader,
        Err(e) => {
            record(
                logger,
                log::Level::Error,
                &format!("Worker cannot open queue {}: {e}", queue.display()),
            );
            return report;
        }
    };

    let header = match reader.read_header() {
        Ok(header) => header,
        Err(QueueError::MalformedHeader { .. }) => {
            record(
                logger,
                log::Level::Error,
                &format!("Queue {} has an incorrect structure", queue.display()),
            );
            return report;
        }
        Err(e) => {
            record(logger, log::Level::Error, &e.to_string());
            return report;
        }
    };

    log::debug!(
        "Worker started on {} ({} -> {})",
        queue.display(),
        header.origin.display(),
        header.destination.display()
    );

    loop {
        if state.is_cancelled() {
            log::debug!("Worker on {} cancelled", queue.display());
            report.cancelled = true;
            break;
        }

        let relative = match reader.next_entry() {
            Ok(Some(relative)) => relative,
            Ok(None) => break,
            Err(e) => {
                record(logger, log::Level::Error, &e.to_string());
                break;
            }
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let source = header.origin.join(&relative);
        let target = header.destination.join(&relative);

        match copy_file(&source, &target) {
            Ok(FileCopyOutcome::Copied { bytes }) => {
                state.record_copied(bytes);
                report.copied += 1;
            }
            Ok(FileCopyOutcome::SourceNotFound) => {
                record(
                    logger,
                    log::Level::Warn,
                    &format!("Source file does not exist, skipped: {}", source.display()),
                );
                report.skipped += 1;
            }
            Ok(FileCopyOutcome::NotRegularFile) => {
                record(
                    logger,
                    log::Level::Warn,
                    &format!("Not a regular file, skipped: {}", source.display()),
                );
                report.skipped += 1;
            }
            Err(e) => {
                state.set_error();
                record(
                    logger,
                    log::Level::Error,
                    &format!("Cannot copy {}: {e}", source.display()),
                );
                report.failed += 1;
            }
        }
    }

    log::debug!(
        "Worker on {} done: {} copied, {} skipped, {} failed",
        queue.display(),
        report.copied,
        report.skipped,
        report.failed
    );
    report
}

/// Outcome of joining a [`WorkerSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Reports of the workers that returned normally, in queue order.
    pub reports: Vec<WorkerReport>,
    /// Number of workers that panicked.
    pub panicked: usize,
}

/// Running workers of one run.
///
/// Dropping the set joins every worker that has not been joined yet.
#[derive(Debug, Default)]
pub struct WorkerSet {
    handles: Vec<JoinHandle<WorkerReport>>,
}

impl WorkerSet {
    /// Number of workers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the set has no workers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Whether every worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handles.iter().all(JoinHandle::is_finished)
    }

    /// Wait for every worker.
    #[must_use]
    pub fn join(mut self) -> JoinOutcome {
        let mut outcome = JoinOutcome::default();
        for handle in std::mem::take(&mut self.handles) {
            match handle.join() {
                Ok(report) => outcome.reports.push(report),
                Err(_) => {
                    log::error!("A copy worker panicked");
                    outcome.panicked += 1;
                }
            }
        }
        outcome
    }
}

impl Drop for WorkerSet {
    fn drop(&mut self) {
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::error!("A copy worker panicked");
            }
        }
    }
}

impl CopyEngine {
    /// Spawn one worker thread per queue `0..concurrency`.
    ///
    /// # Errors
    ///
    /// * If a thread cannot be spawned; workers already started are
    ///   cancelled and joined first
    pub fn spawn_workers(&self, concurrency: u32) -> std::io::Result<WorkerSet> {
        let mut set = WorkerSet {
            handles: Vec::with_capacity(concurrency as usize),
        };

        for (index, queue) in self.location().queue_paths(concurrency).enumerate() {
            let state = Arc::clone(self.state());
            let logger = Arc::clone(self.logger());

            let spawned = thread::Builder::new()
                .name(format!("parcopy-worker-{index}"))
                .spawn(move || run_worker(&queue, &state, &logger));

            match spawned {
                Ok(handle) => set.handles.push(handle),
                Err(e) => {
                    log::error!("Failed to spawn copy worker {index}: {e}");
                    self.state().cancel();
                    drop(set);
                    return Err(e);
                }
            }
        }

        log::debug!("Spawned {} copy workers", set.len());
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcopy_queue::{QueueHeader, QueueLocation, QueueWriter};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        origin: PathBuf,
        destination: PathBuf,
        state: Arc<RunState>,
        logger: RunLogger,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let origin = dir.path().join("origin");
        let destination = dir.path().join("dest");
        fs::create_dir_all(&origin).unwrap();
        fs::create_dir_all(&destination).unwrap();
        let logger = RunLogger::new(dir.path().join("run.log"));
        logger.start_logging().unwrap();
        Fixture {
            dir,
            origin,
            destination,
            state: RunState::new(),
            logger,
        }
    }

    impl Fixture {
        fn write_queue(&self, entries: &[&str]) -> PathBuf {
            let path = self.dir.path().join("copy_plan_0.txt");
            let header = QueueHeader {
                origin: self.origin.clone(),
                destination: self.destination.clone(),
            };
            let mut writer = QueueWriter::create(&path, &header).unwrap();
            for entry in entries {
                writer.push(Path::new(entry)).unwrap();
            }
            writer.finish().unwrap();
            path
        }

        fn log(&self) -> String {
            self.logger.finish_logging();
            fs::read_to_string(self.logger.path()).unwrap()
        }
    }

    #[test]
    fn test_worker_one_file() {
        let f = fixture();
        fs::write(f.origin.join("a.txt"), "0123456789").unwrap();
        let queue = f.write_queue(&["a.txt"]);

        let report = run_worker(&queue, &f.state, &f.logger);

        assert_eq!(report.copied, 1);
        assert_eq!(
            fs::read_to_string(f.destination.join("a.txt")).unwrap(),
            "0123456789"
        );
        assert_eq!(f.state.copied_files(), 1);
        assert_eq!(f.state.copied_bytes(), 10);
        assert_eq!(f.state.finished_workers(), 1);
        assert!(!f.state.is_copy_error_happened());
    }

    #[test]
    fn test_worker_many_files_with_blank_lines() {
        let f = fixture();
        fs::create_dir_all(f.origin.join("sub")).unwrap();
        fs::write(f.origin.join("one.txt"), "1").unwrap();
        fs::write(f.origin.join("sub/two.txt"), "22").unwrap();
        let path = f.dir.path().join("queue.txt");
        fs::write(
            &path,
            format!(
                "{}\n{}\none.txt\n\n\nsub/two.txt\n",
                f.origin.display(),
                f.destination.display()
            ),
        )
        .unwrap();

        let report = run_worker(&path, &f.state, &f.logger);

        assert_eq!(report.copied, 2);
        assert_eq!(f.state.copied_bytes(), 3);
        assert_eq!(fs::read_to_string(f.destination.join("sub/two.txt")).unwrap(), "22");
    }

    #[test]
    fn test_worker_skips_missing_and_non_regular() {
        let f = fixture();
        fs::create_dir_all(f.origin.join("a_dir")).unwrap();
        fs::write(f.origin.join("present.txt"), "here").unwrap();
        let queue = f.write_queue(&["gone.txt", "a_dir", "present.txt"]);

        let report = run_worker(&queue, &f.state, &f.logger);

        assert_eq!(
            report,
            WorkerReport {
                copied: 1,
                skipped: 2,
                failed: 0,
                cancelled: false,
            }
        );
        assert!(!f.state.is_copy_error_happened());
        let log = f.log();
        assert!(log.contains("does not exist, skipped"));
        assert!(log.contains("Not a regular file, skipped"));
    }

    #[test]
    fn test_worker_continues_after_copy_failure() {
        let f = fixture();
        fs::write(f.origin.join("blocked.txt"), "x").unwrap();
        fs::write(f.origin.join("fine.txt"), "y").unwrap();
        // A directory where the target file must go
        fs::create_dir_all(f.destination.join("blocked.txt")).unwrap();
        let queue = f.write_queue(&["blocked.txt", "fine.txt"]);

        let report = run_worker(&queue, &f.state, &f.logger);

        assert_eq!(report.failed, 1);
        assert_eq!(report.copied, 1);
        assert!(f.state.is_copy_error_happened());
        assert_eq!(f.state.copied_files(), 1);
        assert!(f.destination.join("fine.txt").exists());
        let source = f.origin.join("blocked.txt");
        assert!(f.log().contains(&format!("Cannot copy {}", source.display())));
    }

    #[test]
    fn test_worker_cannot_open_queue() {
        let f = fixture();

        let report = run_worker(&f.dir.path().join("absent.txt"), &f.state, &f.logger);

        assert_eq!(report, WorkerReport::default());
        assert_eq!(f.state.finished_workers(), 1);
        assert!(f.log().contains("cannot open queue"));
    }

    #[test]
    fn test_worker_incorrect_structure() {
        let f = fixture();
        let path = f.dir.path().join("queue.txt");
        fs::write(&path, "\n/dest\nfile.txt\n").unwrap();

        let report = run_worker(&path, &f.state, &f.logger);

        assert_eq!(report.copied, 0);
        assert_eq!(f.state.finished_workers(), 1);
        assert!(f.log().contains("incorrect structure"));
    }

    #[test]
    fn test_worker_stops_when_cancelled() {
        let f = fixture();
        fs::write(f.origin.join("a.txt"), "a").unwrap();
        let queue = f.write_queue(&["a.txt"]);
        f.state.cancel();

        let report = run_worker(&queue, &f.state, &f.logger);

        assert!(report.cancelled);
        assert_eq!(report.copied, 0);
        assert!(!f.destination.join("a.txt").exists());
        assert_eq!(f.state.finished_workers(), 1);
    }

    #[test]
    fn test_spawn_and_join_workers() {
        let dir = TempDir::new().unwrap();
        let engine = CopyEngine::new(
            QueueLocation::new(dir.path()),
            Arc::new(RunLogger::new(dir.path().join("run.log"))),
        );

        // Queues that do not exist: every worker logs and exits
        let set = engine.spawn_workers(3).unwrap();
        assert_eq!(set.len(), 3);
        let outcome = set.join();

        assert_eq!(outcome.reports.len(), 3);
        assert_eq!(outcome.panicked, 0);
        assert_eq!(engine.state().finished_workers(), 3);
    }

    #[test]
    fn test_dropping_set_joins_workers() {
        let dir = TempDir::new().unwrap();
        let engine = CopyEngine::new(
            QueueLocation::new(dir.path()),
            Arc::new(RunLogger::new(dir.path().join("run.log"))),
        );

        drop(engine.spawn_workers(4).unwrap());

        assert_eq!(engine.state().finished_workers(), 4);
    }

    #[test]
    fn test_panicked_worker_is_counted() {
        let state = RunState::new();
        let worker_state = Arc::clone(&state);
        let set = WorkerSet {
            handles: vec![thread::spawn(move || {
                let _finished = FinishGuard(&worker_state);
                panic!("worker failure");
            })],
        };

        let outcome = set.join();

        assert_eq!(outcome.panicked, 1);
        assert!(outcome.reports.is_empty());
        assert_eq!(state.finished_workers(), 1);
    }

    #[test]
    fn test_dropping_set_survives_panicked_worker() {
        let state = RunState::new();
        let worker_state = Arc::clone(&state);
        let set = WorkerSet {
            handles: vec![
                thread::spawn(move || {
                    let _finished = FinishGuard(&worker_state);
                    panic!("worker failure");
                }),
                thread::spawn(WorkerReport::default),
            ],
        };

        drop(set);

        assert_eq!(state.finished_workers(), 1);
    }
}
