//! Error types for copy runs.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use parcopy_queue::QueueError;

/// Errors that can occur while planning a run.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The concurrency factor was zero.
    #[error("Concurrency must be at least 1")]
    ZeroConcurrency,

    /// The origin path was empty.
    #[error("Origin path is empty")]
    EmptyOrigin,

    /// The destination path was empty.
    #[error("Destination path is empty")]
    EmptyDestination,

    /// The origin does not exist.
    #[error("Origin does not exist: {}", .0.display())]
    OriginNotFound(PathBuf),

    /// The destination does not exist.
    #[error("Destination does not exist: {}", .0.display())]
    DestinationNotFound(PathBuf),

    /// Origin and destination are the same directory.
    #[error("Origin and destination are the same directory: {}", .0.display())]
    SameOriginAndDestination(PathBuf),

    /// A path could not be made absolute.
    #[error("Failed to resolve {}: {source}", path.display())]
    Resolve {
        /// The path as given.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Walking the origin or writing the queues failed.
    #[error("Failed to plan copy: {0}")]
    Planning(#[from] QueueError),
}

impl PlanError {
    /// Whether this error was raised by argument validation, before any
    /// side effect.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        !matches!(self, Self::Planning(_) | Self::Resolve { .. })
    }
}

/// Errors that can occur while copying a single file.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// Failed to create the target's parent directory.
    #[error("Failed to create directory {}: {io_error}", path.display())]
    CreateDirError {
        /// The directory path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to copy a file.
    #[error("Failed to copy {} to {}: {io_error}", source_path.display(), target_path.display())]
    FileCopyError {
        /// Source file path.
        source_path: PathBuf,
        /// Target file path.
        target_path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to get file metadata.
    #[error("Failed to get metadata for {}: {io_error}", path.display())]
    MetadataError {
        /// The file path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },
}
