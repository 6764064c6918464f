//! Persisted work queues for parallel directory copies.
//!
//! This crate provides the on-disk side of a copy run:
//!
//! * [`QueueLocation`] - where queue files live and how they are named
//! * [`QueueWriter`] / [`QueueReader`] - the line-based queue format
//! * [`partition_tree`] - a serial `jwalk` traversal that deals the regular
//!   files of an origin tree round-robin across N queues
//!
//! # Example
//!
//! ```rust,ignore
//! use parcopy_queue::{QueueLocation, QueueReader, partition_tree};
//!
//! let location = QueueLocation::default();
//! let stats = partition_tree(&location, origin, destination, 4)?;
//!
//! let mut queue = QueueReader::open(&location.queue_path(0))?;
//! let header = queue.read_header()?;
//! while let Some(relative) = queue.next_entry()? {
//!     println!("{}", header.origin.join(relative).display());
//! }
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod format;
mod location;
mod partition;

pub use error::QueueError;
pub use format::{
    QueueHeader, QueueReader, QueueWriter, decode_path, encode_path, read_queue_header,
};
pub use location::{DEFAULT_EXTENSION, DEFAULT_PREFIX, QueueLocation};
pub use partition::{PartitionStats, partition_tree};
