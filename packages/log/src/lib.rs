//! Per-run message log for parallel copy runs.
//!
//! A [`RunLogger`] is created once per process and shared (usually behind an
//! `Arc`) by the planner and every worker thread. Messages are only accepted
//! between [`RunLogger::start_logging`] and [`RunLogger::finish_logging`];
//! each accepted message becomes one line of the form `"<sequence>: <text>"`
//! in the backing file.
//!
//! # Example
//!
//! ```rust,ignore
//! use parcopy_log::RunLogger;
//!
//! let logger = RunLogger::new(RunLogger::default_path());
//! logger.start_logging()?;
//! logger.log_message("Cannot copy /src/a.txt");
//! logger.finish_logging();
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// File name of the run log inside its directory.
pub const LOG_FILE_NAME: &str = "parcopy_log.txt";

/// An open logging session.
#[derive(Debug)]
struct Session {
    writer: LineWriter<File>,
    sequence: u64,
}

/// Thread-safe, append-only run log with an explicit start/finish lifecycle.
#[derive(Debug)]
pub struct RunLogger {
    path: PathBuf,
    session: Mutex<Option<Session>>,
}

impl RunLogger {
    /// Create an idle logger writing to `path` once started.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            session: Mutex::new(None),
        }
    }

    /// Default log location: [`LOG_FILE_NAME`] in the system temp directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join(LOG_FILE_NAME)
    }

    /// Path of the backing log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a session is currently open.
    #[must_use]
    pub fn is_logging(&self) -> bool {
        self.lock().is_some()
    }

    /// Open the log file (truncating it) and reset the sequence to 1.
    ///
    /// Does nothing if a session is already open.
    ///
    /// # Errors
    ///
    /// * If the log file cannot be created
    pub fn start_logging(&self) -> io::Result<()> {
        let mut session = self.lock();
        if session.is_some() {
            log::trace!("Run log already open at {}", self.path.display());
            return Ok(());
        }

        let file = File::create(&self.path)?;
        *session = Some(Session {
            writer: LineWriter::new(file),
            sequence: 1,
        });

        log::debug!("Opened run log {}", self.path.display());
        Ok(())
    }

    /// Flush and close the log file. Does nothing if no session is open.
    pub fn finish_logging(&self) {
        let Some(mut session) = self.lock().take() else {
            return;
        };

        if let Err(e) = session.writer.flush() {
            log::warn!("Failed to flush run log {}: {e}", self.path.display());
        }
        log::debug!(
            "Closed run log {} after {} messages",
            self.path.display(),
            session.sequence - 1
        );
    }

    /// Append one numbered message.
    ///
    /// Returns `false` without writing when `text` is empty, when no session
    /// is open, or when the write fails.
    pub fn log_message(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }

        let mut guard = self.lock();
        let Some(session) = guard.as_mut() else {
            return false;
        };

        match writeln!(session.writer, "{}: {text}", session.sequence) {
            Ok(()) => {
                log::trace!("[run log {}] {text}", session.sequence);
                session.sequence += 1;
                true
            }
            Err(e) => {
                log::warn!("Failed to write run log {}: {e}", self.path.display());
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        // Poisoning is ignored: a session has no invariant a panic can break.
        self.session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for RunLogger {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.finish_logging();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn logger_in(dir: &TempDir) -> RunLogger {
        RunLogger::new(dir.path().join(LOG_FILE_NAME))
    }

    #[test]
    fn test_log_message_rejected_when_idle() {
        let dir = TempDir::new().unwrap();
        let logger = logger_in(&dir);

        assert!(!logger.is_logging());
        assert!(!logger.log_message("Test message"));
        assert!(!logger.log_message(""));
        assert!(!logger.path().exists());
    }

    #[test]
    fn test_log_messages_are_numbered() {
        let dir = TempDir::new().unwrap();
        let logger = logger_in(&dir);
        let long_message = "1234567890 ".repeat(30);

        logger.start_logging().unwrap();
        assert!(logger.log_message("Test message"));
        assert!(logger.log_message(&long_message));
        assert!(!logger.log_message(""));
        logger.finish_logging();

        let content = fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "1: Test message");
        assert_eq!(lines[1], format!("2: {long_message}"));
    }

    #[test]
    fn test_sequence_restarts_each_session() {
        let dir = TempDir::new().unwrap();
        let logger = logger_in(&dir);

        logger.start_logging().unwrap();
        logger.log_message("first run");
        logger.log_message("first run again");
        logger.finish_logging();

        logger.start_logging().unwrap();
        logger.log_message("second run");
        logger.finish_logging();

        let content = fs::read_to_string(logger.path()).unwrap();
        assert_eq!(content, "1: second run\n");
    }

    #[test]
    fn test_start_and_finish_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let logger = logger_in(&dir);

        logger.finish_logging();
        logger.start_logging().unwrap();
        logger.log_message("one");
        // Second start must not truncate or reset the sequence
        logger.start_logging().unwrap();
        logger.log_message("two");
        logger.finish_logging();
        logger.finish_logging();

        let content = fs::read_to_string(logger.path()).unwrap();
        assert_eq!(content, "1: one\n2: two\n");
        assert!(!logger.is_logging());
    }

    #[test]
    fn test_concurrent_writers_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let logger = Arc::new(logger_in(&dir));
        logger.start_logging().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let logger = Arc::clone(&logger);
                thread::spawn(move || {
                    for i in 0..50 {
                        assert!(logger.log_message(&format!("thread {t} message {i}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        logger.finish_logging();

        let content = fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 400);
        for (i, line) in lines.iter().enumerate() {
            let (seq, text) = line.split_once(": ").unwrap();
            assert_eq!(seq.parse::<usize>().unwrap(), i + 1);
            assert!(text.starts_with("thread "));
            assert!(text.contains(" message "));
        }
    }
}
