//! Well-known queue file naming.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

/// Default queue file name prefix.
pub const DEFAULT_PREFIX: &str = "copy_plan_";

/// Default queue file extension.
pub const DEFAULT_EXTENSION: &str = ".txt";

/// Where queue files live and how they are named.
///
/// Queue `i` is `<dir>/<prefix><i><extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueLocation {
    dir: PathBuf,
    prefix: String,
    extension: String,
}

impl QueueLocation {
    /// Queues in `dir` with the default prefix and extension.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Replace the file name prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Replace the file extension (including the leading dot).
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Directory holding the queue files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// File extension.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of queue `index`.
    #[must_use]
    pub fn queue_path(&self, index: u32) -> PathBuf {
        self.dir
            .join(format!("{}{index}{}", self.prefix, self.extension))
    }

    /// Paths of queues `0..count`.
    pub fn queue_paths(&self, count: u32) -> impl Iterator<Item = PathBuf> + '_ {
        (0..count).map(|i| self.queue_path(i))
    }
}

impl Default for QueueLocation {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_naming() {
        let location = QueueLocation::new("/tmp/queues");

        assert_eq!(location.prefix(), "copy_plan_");
        assert_eq!(location.extension(), ".txt");
        assert_eq!(
            location.queue_path(3),
            PathBuf::from("/tmp/queues/copy_plan_3.txt")
        );
    }

    #[test]
    fn test_queue_paths_cover_range() {
        let location = QueueLocation::new("/q")
            .with_prefix("plan-")
            .with_extension(".queue");

        let paths: Vec<PathBuf> = location.queue_paths(3).collect();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("/q/plan-0.queue"),
                PathBuf::from("/q/plan-1.queue"),
                PathBuf::from("/q/plan-2.queue"),
            ]
        );
        assert_eq!(location.queue_paths(0).count(), 0);
    }

    #[test]
    fn test_default_uses_temp_dir() {
        assert_eq!(QueueLocation::default().dir(), std::env::temp_dir());
    }
}
