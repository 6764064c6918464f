//! Error types for queue files.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing or reading queue files.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Failed to create a queue file.
    #[error("Failed to create queue {}: {source}", path.display())]
    CreateError {
        /// The queue file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to open an existing queue file.
    #[error("Failed to open queue {}: {source}", path.display())]
    OpenError {
        /// The queue file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to a queue file.
    #[error("Failed to write queue {}: {source}", path.display())]
    WriteError {
        /// The queue file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read from a queue file.
    #[error("Failed to read queue {}: {source}", path.display())]
    ReadError {
        /// The queue file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The origin or destination header line is missing or empty.
    #[error("Queue {} has an incorrect structure: missing {field} header", path.display())]
    MalformedHeader {
        /// The queue file path.
        path: PathBuf,
        /// Which header line is missing.
        field: &'static str,
    },

    /// The origin directory could not be listed.
    #[error("Failed to read origin directory {}: {source}", path.display())]
    OriginUnreadable {
        /// The origin path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
