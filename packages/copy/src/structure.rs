//! Destination directory tree replication.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::path::Path;

use parcopy_queue::{QueueError, read_queue_header};

use crate::engine::{CopyEngine, record};

/// Result of [`CopyEngine::copy_dir_structure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureOutcome {
    /// Every origin directory exists under the destination.
    Replicated {
        /// Directories visited below the origin root.
        directories: u64,
    },
    /// Queue 0 was missing or invalid, nothing was created.
    Skipped,
    /// Some directories could not be created.
    Failed {
        /// Number of directories or entries that failed.
        failures: u64,
    },
}

impl StructureOutcome {
    /// Whether the worker phase may start.
    #[must_use]
    pub const fn is_replicated(&self) -> bool {
        matches!(self, Self::Replicated { .. })
    }
}

impl CopyEngine {
    /// Recreate the origin's directory tree under the destination, using the
    /// header of queue 0. No file content is copied and existing directories
    /// are kept.
    ///
    /// Problems are logged and set the sticky error flag; they never abort
    /// the caller.
    #[must_use]
    pub fn copy_dir_structure(&self) -> StructureOutcome {
        let first_queue = self.location().queue_path(0);

        let header = match read_queue_header(&first_queue) {
            Ok(header) => header,
            Err(e) => {
                let message = match e {
                    QueueError::OpenError { .. } if !first_queue.exists() => format!(
                        "Cannot copy directory structure: queue {} does not exist",
                        first_queue.display()
                    ),
                    QueueError::MalformedHeader { .. } => format!(
                        "Cannot copy directory structure: queue {} has an incorrect structure",
                        first_queue.display()
                    ),
                    other => format!("Cannot copy directory structure: {other}"),
                };
                return self.skip_structure(&message);
            }
        };

        if !header.origin.is_dir() {
            return self.skip_structure(&format!(
                "Cannot copy directory structure: origin {} does not exist",
                header.origin.display()
            ));
        }
        if !header.destination.is_dir() {
            return self.skip_structure(&format!(
                "Cannot copy directory structure: destination {} does not exist",
                header.destination.display()
            ));
        }

        let (directories, failures) = replicate_dirs(&header.origin, &header.destination, |m| {
            record(self.logger(), log::Level::Error, m);
        });

        if failures > 0 {
            self.state().set_error();
            record(
                self.logger(),
                log::Level::Error,
                &format!(
                    "Directory structure of {} is incomplete: {failures} failures",
                    header.destination.display()
                ),
            );
            return StructureOutcome::Failed { failures };
        }

        log::debug!(
            "Replicated {directories} directories into {}",
            header.destination.display()
        );
        StructureOutcome::Replicated { directories }
    }

    fn skip_structure(&self, message: &str) -> StructureOutcome {
        self.state().set_error();
        record(self.logger(), log::Level::Error, message);
        StructureOutcome::Skipped
    }
}

/// Create every directory below `origin` under `destination`.
///
/// Returns `(directories, failures)`.
fn replicate_dirs(origin: &Path, destination: &Path, on_failure: impl Fn(&str)) -> (u64, u64) {
    let mut directories = 0;
    let mut failures = 0;

    for entry in jwalk::WalkDir::new(origin)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                on_failure(&format!(
                    "Failed to list directory while replicating into {}: {e}",
                    destination.display()
                ));
                failures += 1;
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let Ok(relative) = path.strip_prefix(origin) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = destination.join(relative);
        match fs::create_dir_all(&target) {
            Ok(()) => directories += 1,
            Err(e) => {
                on_failure(&format!(
                    "Failed to create directory {}: {e}",
                    target.display()
                ));
                failures += 1;
            }
        }
    }

    (directories, failures)
}
