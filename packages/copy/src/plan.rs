//! Queue planning and cleanup.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parcopy_queue::partition_tree;

use crate::engine::{CopyEngine, record};
use crate::error::PlanError;

/// Totals of a successfully planned run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSummary {
    /// Total bytes to copy.
    pub scope_size: u64,
    /// Total files to copy.
    pub file_num: u64,
    /// Entries left out because they could not be read.
    pub skipped: u64,
}

/// Reject arguments that must not start a run.
fn validate(origin: &Path, destination: &Path, concurrency: u32) -> Result<(), PlanError> {
    if concurrency == 0 {
        return Err(PlanError::ZeroConcurrency);
    }
    if origin.as_os_str().is_empty() {
        return Err(PlanError::EmptyOrigin);
    }
    if destination.as_os_str().is_empty() {
        return Err(PlanError::EmptyDestination);
    }
    if !origin.exists() {
        return Err(PlanError::OriginNotFound(origin.to_path_buf()));
    }
    if !destination.exists() {
        return Err(PlanError::DestinationNotFound(destination.to_path_buf()));
    }

    let same = path_clean::clean(origin) == path_clean::clean(destination)
        || matches!(
            (fs::canonicalize(origin), fs::canonicalize(destination)),
            (Ok(a), Ok(b)) if a == b
        );
    if same {
        return Err(PlanError::SameOriginAndDestination(origin.to_path_buf()));
    }

    Ok(())
}

/// `path` made absolute against the current directory, so queue headers
/// resolve from any process.
fn absolute(path: &Path) -> Result<PathBuf, PlanError> {
    std::path::absolute(path).map_err(|e| PlanError::Resolve {
        path: path.to_path_buf(),
        source: e,
    })
}

impl CopyEngine {
    /// Plan a run: write `concurrency` queues dealing every regular file of
    /// `origin` round-robin, then reset the run state and open a new run log
    /// session.
    ///
    /// Invalid arguments fail before anything is written. If the walk fails,
    /// the partially written queues are removed.
    ///
    /// # Arguments
    ///
    /// * `origin` - Directory to copy from
    /// * `destination` - Existing directory to copy into
    /// * `concurrency` - Number of queues (and workers)
    ///
    /// # Errors
    ///
    /// * If the arguments are invalid (see [`PlanError::is_validation`])
    /// * If the origin cannot be listed or a queue cannot be written
    pub fn create_queues(
        &self,
        origin: &Path,
        destination: &Path,
        concurrency: u32,
    ) -> Result<PlanSummary, PlanError> {
        validate(origin, destination, concurrency)?;

        let origin = &absolute(origin)?;
        let destination = &absolute(destination)?;

        let stats = match partition_tree(self.location(), origin, destination, concurrency) {
            Ok(stats) => stats,
            Err(e) => {
                log::error!(
                    "create_queues({}, {}, {concurrency}) failed: {e}",
                    origin.display(),
                    destination.display()
                );
                self.delete_queue_files(concurrency);
                return Err(e.into());
            }
        };

        self.state().reset(stats.scope_size, stats.file_num);

        if let Err(e) = self.logger().start_logging() {
            log::warn!(
                "Failed to open run log {}: {e}",
                self.logger().path().display()
            );
        }
        record(
            self.logger(),
            log::Level::Info,
            &format!(
                "Planned {} files ({} bytes) from {} to {} across {concurrency} queues",
                stats.file_num,
                stats.scope_size,
                origin.display(),
                destination.display()
            ),
        );
        if stats.skipped > 0 {
            record(
                self.logger(),
                log::Level::Warn,
                &format!("{} unreadable entries were left out", stats.skipped),
            );
        }

        Ok(PlanSummary {
            scope_size: stats.scope_size,
            file_num: stats.file_num,
            skipped: stats.skipped,
        })
    }

    /// Delete queues `0..concurrency` and close the run log session.
    ///
    /// Missing queues are ignored, so this is safe to call at any time and
    /// any number of times.
    pub fn remove_queues(&self, concurrency: u32) {
        self.delete_queue_files(concurrency);
        self.logger().finish_logging();
    }

    fn delete_queue_files(&self, concurrency: u32) {
        for path in self.location().queue_paths(concurrency) {
            match fs::remove_file(&path) {
                Ok(()) => log::trace!("Removed queue {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove queue {}: {e}", path.display()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcopy_log::RunLogger;
    use parcopy_queue::{QueueLocation, QueueReader, read_queue_header};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        origin: PathBuf,
        destination: PathBuf,
        engine: CopyEngine,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let origin = dir.path().join("origin");
        let destination = dir.path().join("dest");
        let queues = dir.path().join("queues");
        fs::create_dir_all(&origin).unwrap();
        fs::create_dir_all(&destination).unwrap();
        fs::create_dir_all(&queues).unwrap();

        let engine = CopyEngine::new(
            QueueLocation::new(&queues),
            Arc::new(RunLogger::new(dir.path().join("run.log"))),
        );
        Fixture {
            _dir: dir,
            origin,
            destination,
            engine,
        }
    }

    fn queue_sizes(engine: &CopyEngine, concurrency: u32) -> Vec<usize> {
        engine
            .location()
            .queue_paths(concurrency)
            .map(|path| {
                let mut reader = QueueReader::open(&path).unwrap();
                reader.read_header().unwrap();
                let mut count = 0;
                while let Some(entry) = reader.next_entry().unwrap() {
                    if !entry.as_os_str().is_empty() {
                        count += 1;
                    }
                }
                count
            })
            .collect()
    }

    fn no_queue_files(engine: &CopyEngine) -> bool {
        fs::read_dir(engine.location().dir()).unwrap().next().is_none()
    }

    #[test]
    fn test_create_queues_two_files() {
        let f = fixture();
        fs::create_dir_all(f.origin.join("sub")).unwrap();
        fs::write(f.origin.join("a.txt"), vec![b'a'; 10]).unwrap();
        fs::write(f.origin.join("sub/b.txt"), vec![b'b'; 20]).unwrap();

        let summary = f.engine.create_queues(&f.origin, &f.destination, 2).unwrap();

        assert_eq!(summary.scope_size, 30);
        assert_eq!(summary.file_num, 2);
        assert_eq!(queue_sizes(&f.engine, 2), vec![1, 1]);
        assert_eq!(f.engine.state().scope_size(), 30);
        assert_eq!(f.engine.state().file_num(), 2);
        assert!(f.engine.logger().is_logging());

        f.engine.remove_queues(2);
    }

    #[test]
    fn test_create_queues_counts_match_tree() {
        let f = fixture();
        let mut expected_size = 0u64;
        for d in 0..5 {
            let sub = f.origin.join(format!("level1_{d}/level2"));
            fs::create_dir_all(&sub).unwrap();
            for i in 0..7 {
                let content = vec![b'z'; d * 7 + i];
                expected_size += content.len() as u64;
                fs::write(sub.join(format!("file{i}.bin")), content).unwrap();
            }
        }

        let summary = f.engine.create_queues(&f.origin, &f.destination, 8).unwrap();

        assert_eq!(summary.file_num, 35);
        assert_eq!(summary.scope_size, expected_size);
        let sizes = queue_sizes(&f.engine, 8);
        assert_eq!(sizes.iter().sum::<usize>(), 35);
        assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);

        f.engine.remove_queues(8);
    }

    #[test]
    fn test_create_queues_rejects_invalid_input() {
        let f = fixture();
        let origin = f.origin.as_path();
        let destination = f.destination.as_path();
        let missing = f.origin.join("not_existing_dir");
        let missing = missing.as_path();
        let empty = Path::new("");

        let cases = [
            (origin, destination, 0),
            (empty, destination, 8),
            (origin, empty, 8),
            (missing, destination, 8),
            (origin, missing, 8),
            (origin, origin, 8),
        ];

        for (origin, destination, concurrency) in cases {
            let err = f
                .engine
                .create_queues(origin, destination, concurrency)
                .unwrap_err();
            assert!(err.is_validation(), "unexpected error: {err}");
            assert!(no_queue_files(&f.engine));
        }
        assert!(!f.engine.logger().is_logging());
    }

    #[test]
    fn test_same_directory_after_normalization() {
        let f = fixture();
        let dotted = f.origin.join(".");
        let trailing = PathBuf::from(format!("{}/", f.origin.display()));

        assert!(matches!(
            f.engine.create_queues(&f.origin, &dotted, 2),
            Err(PlanError::SameOriginAndDestination(_))
        ));
        assert!(matches!(
            f.engine.create_queues(&trailing, &f.origin, 2),
            Err(PlanError::SameOriginAndDestination(_))
        ));
    }

    #[test]
    fn test_origin_file_is_planning_error() {
        let f = fixture();
        let file = f.origin.join("plain.txt");
        fs::write(&file, "x").unwrap();

        let err = f.engine.create_queues(&file, &f.destination, 4).unwrap_err();

        assert!(!err.is_validation());
        assert!(no_queue_files(&f.engine));
    }

    #[test]
    fn test_create_queues_resets_sticky_error() {
        let f = fixture();
        fs::write(f.origin.join("a.txt"), "a").unwrap();
        f.engine.state().set_error();
        f.engine.state().cancel();

        f.engine.create_queues(&f.origin, &f.destination, 1).unwrap();

        assert!(!f.engine.is_copy_error_happened());
        assert!(!f.engine.state().is_cancelled());
        f.engine.remove_queues(1);
    }

    #[test]
    fn test_failed_validation_keeps_sticky_error() {
        let f = fixture();
        f.engine.state().set_error();

        assert!(f.engine.create_queues(&f.origin, &f.destination, 0).is_err());

        assert!(f.engine.is_copy_error_happened());
    }

    #[test]
    fn test_remove_queues_is_idempotent() {
        let f = fixture();
        f.engine.remove_queues(4);

        fs::write(f.origin.join("a.txt"), "a").unwrap();
        f.engine.create_queues(&f.origin, &f.destination, 8).unwrap();
        // Leave only a subset of queues behind
        for i in [1, 3, 5] {
            fs::remove_file(f.engine.location().queue_path(i)).unwrap();
        }

        f.engine.remove_queues(8);
        assert!(no_queue_files(&f.engine));
        assert!(!f.engine.logger().is_logging());

        f.engine.remove_queues(8);
        f.engine.remove_queues(0);
        assert!(no_queue_files(&f.engine));
    }

    #[test]
    fn test_run_log_session_opens_on_plan() {
        let f = fixture();
        fs::write(f.origin.join("a.txt"), "a").unwrap();

        f.engine.create_queues(&f.origin, &f.destination, 1).unwrap();
        f.engine.remove_queues(1);

        let log = fs::read_to_string(f.engine.logger().path()).unwrap();
        assert!(log.starts_with("1: Planned 1 files (1 bytes)"));
    }

    #[test]
    fn test_relative_paths_are_written_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let dir = TempDir::new_in(&cwd).unwrap();
        let relative = dir.path().strip_prefix(&cwd).unwrap();
        let origin = relative.join("o");
        let destination = relative.join("d");
        assert!(origin.is_relative());
        fs::create_dir_all(&origin).unwrap();
        fs::create_dir_all(&destination).unwrap();
        fs::write(origin.join("a.txt"), "a").unwrap();
        let engine = CopyEngine::new(
            QueueLocation::new(dir.path()),
            Arc::new(RunLogger::new(dir.path().join("run.log"))),
        );

        engine.create_queues(&origin, &destination, 1).unwrap();
        let header = read_queue_header(&engine.location().queue_path(0)).unwrap();
        engine.remove_queues(1);

        assert!(header.origin.is_absolute(), "{}", header.origin.display());
        assert!(header.destination.is_absolute());
        assert_eq!(header.origin, std::path::absolute(&origin).unwrap());
        assert_eq!(header.destination, std::path::absolute(&destination).unwrap());
    }
}
