//! The copy engine: queue location, run log and run state of one process.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::Arc;

use parcopy_log::RunLogger;
use parcopy_queue::QueueLocation;

use crate::progress::RunState;

/// Owns everything a run shares between the planner, the structure
/// replicator and the workers.
///
/// Planning and cleanup happen on the caller's thread; workers get clones of
/// the `Arc`s.
#[derive(Debug, Clone)]
pub struct CopyEngine {
    location: QueueLocation,
    logger: Arc<RunLogger>,
    state: Arc<RunState>,
}

impl CopyEngine {
    /// Create an engine writing queues to `location` and messages to `logger`.
    #[must_use]
    pub fn new(location: QueueLocation, logger: Arc<RunLogger>) -> Self {
        Self {
            location,
            logger,
            state: RunState::new(),
        }
    }

    /// Queue naming and directory.
    #[must_use]
    pub const fn location(&self) -> &QueueLocation {
        &self.location
    }

    /// The run log.
    #[must_use]
    pub const fn logger(&self) -> &Arc<RunLogger> {
        &self.logger
    }

    /// The shared run state.
    #[must_use]
    pub const fn state(&self) -> &Arc<RunState> {
        &self.state
    }

    /// Whether any copy error happened since the last successful plan.
    #[must_use]
    pub fn is_copy_error_happened(&self) -> bool {
        self.state.is_copy_error_happened()
    }
}

impl Default for CopyEngine {
    fn default() -> Self {
        Self::new(QueueLocation::default(), Arc::new(RunLogger::default()))
    }
}

/// Write `message` to the diagnostic log at `level` and to the run log.
pub(crate) fn record(logger: &RunLogger, level: log::Level, message: &str) {
    log::log!(level, "{message}");
    logger.log_message(message);
}
