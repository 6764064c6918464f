//! Shared run state: progress counters, cancellation and the sticky error flag.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

/// Point-in-time view of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunProgress {
    /// Total bytes planned.
    pub scope_size: u64,
    /// Total files planned.
    pub file_num: u64,
    /// Bytes copied so far.
    pub copied_bytes: u64,
    /// Files copied so far.
    pub copied_files: u64,
    /// Workers that have exited.
    pub finished_workers: u32,
    /// Whether cancellation was requested.
    pub cancelled: bool,
    /// Whether any copy error happened.
    pub error: bool,
}

impl RunProgress {
    /// Progress as a percentage (0.0 to 100.0), by bytes when the scope is
    /// known and by files otherwise.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let ratio = if self.scope_size > 0 {
            self.copied_bytes as f64 / self.scope_size as f64
        } else if self.file_num > 0 {
            self.copied_files as f64 / self.file_num as f64
        } else {
            1.0
        };
        (ratio * 100.0).min(100.0)
    }
}

/// State shared between the orchestrator and every worker of a run.
///
/// The error flag is sticky: workers only ever set it, and it is cleared
/// only when the next run is planned.
#[derive(Debug, Default)]
pub struct RunState {
    scope_size: AtomicU64,
    file_num: AtomicU64,
    copied_bytes: AtomicU64,
    copied_files: AtomicU64,
    finished_workers: AtomicU32,
    cancel: AtomicBool,
    error: AtomicBool,
}

impl RunState {
    /// Create a new, zeroed run state.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Zero every counter, clear both flags and record the planned totals.
    pub(crate) fn reset(&self, scope_size: u64, file_num: u64) {
        self.scope_size.store(scope_size, Ordering::SeqCst);
        self.file_num.store(file_num, Ordering::SeqCst);
        self.copied_bytes.store(0, Ordering::SeqCst);
        self.copied_files.store(0, Ordering::SeqCst);
        self.finished_workers.store(0, Ordering::SeqCst);
        self.cancel.store(false, Ordering::SeqCst);
        self.error.store(false, Ordering::SeqCst);
    }

    /// Ask every worker to stop before its next file.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Set the sticky error flag.
    pub fn set_error(&self) {
        self.error.store(true, Ordering::SeqCst);
    }

    /// Whether any copy error happened since the run was planned.
    #[must_use]
    pub fn is_copy_error_happened(&self) -> bool {
        self.error.load(Ordering::SeqCst)
    }

    /// Record one successfully copied file of `bytes` bytes.
    pub(crate) fn record_copied(&self, bytes: u64) {
        self.copied_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.copied_files.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn worker_finished(&self) {
        self.finished_workers.fetch_add(1, Ordering::SeqCst);
    }

    /// Total bytes planned.
    #[must_use]
    pub fn scope_size(&self) -> u64 {
        self.scope_size.load(Ordering::SeqCst)
    }

    /// Total files planned.
    #[must_use]
    pub fn file_num(&self) -> u64 {
        self.file_num.load(Ordering::SeqCst)
    }

    /// Bytes copied so far.
    #[must_use]
    pub fn copied_bytes(&self) -> u64 {
        self.copied_bytes.load(Ordering::SeqCst)
    }

    /// Files copied so far.
    #[must_use]
    pub fn copied_files(&self) -> u64 {
        self.copied_files.load(Ordering::SeqCst)
    }

    /// Workers that have exited.
    #[must_use]
    pub fn finished_workers(&self) -> u32 {
        self.finished_workers.load(Ordering::SeqCst)
    }

    /// Get a progress snapshot.
    #[must_use]
    pub fn snapshot(&self) -> RunProgress {
        RunProgress {
            scope_size: self.scope_size(),
            file_num: self.file_num(),
            copied_bytes: self.copied_bytes(),
            copied_files: self.copied_files(),
            finished_workers: self.finished_workers(),
            cancelled: self.is_cancelled(),
            error: self.is_copy_error_happened(),
        }
    }
}
