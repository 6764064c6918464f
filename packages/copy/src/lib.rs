//! Parallel directory copying over persisted work queues.
//!
//! A run goes through these steps, all driven through one [`CopyEngine`]:
//!
//! 1. [`CopyEngine::create_queues`] validates the paths, walks the origin
//!    and deals its regular files round-robin into N queue files
//! 2. [`CopyEngine::copy_dir_structure`] recreates the directory tree under
//!    the destination
//! 3. [`CopyEngine::spawn_workers`] starts one thread per queue; the caller
//!    polls [`RunState`] for progress and may cancel
//! 4. [`WorkerSet::join`] waits for the workers
//! 5. [`CopyEngine::remove_queues`] deletes the queues and closes the run log
//!
//! Per-file failures never stop a run. They are written to the run log and
//! set the sticky error flag ([`RunState::is_copy_error_happened`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use parcopy_copy::CopyEngine;
//!
//! let engine = CopyEngine::default();
//! let plan = engine.create_queues(origin, destination, 8)?;
//! if engine.copy_dir_structure().is_replicated() {
//!     let workers = engine.spawn_workers(8)?;
//!     while !workers.is_finished() {
//!         println!("{:.0}%", engine.state().snapshot().percentage());
//!         std::thread::sleep(std::time::Duration::from_millis(30));
//!     }
//!     workers.join();
//! }
//! engine.remove_queues(8);
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod copy;
mod engine;
mod error;
mod plan;
mod progress;
mod space;
mod structure;
mod worker;

pub use copy::{FileCopyOutcome, copy_file};
pub use engine::CopyEngine;
pub use error::{CopyError, PlanError};
pub use plan::PlanSummary;
pub use progress::{RunProgress, RunState};
pub use space::{available_space, is_enough_space};
pub use structure::StructureOutcome;
pub use worker::{JoinOutcome, WorkerReport, WorkerSet, run_worker};

pub use parcopy_log::{LOG_FILE_NAME, RunLogger};
pub use parcopy_queue::QueueLocation;
