//! Queue file reading and writing.
//!
//! A queue is newline-delimited: line 1 is the origin directory, line 2 the
//! destination directory, and every following line a file path relative to
//! the origin. On Unix lines are raw path bytes; elsewhere they are UTF-8.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::QueueError;

/// The two header lines of a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueHeader {
    /// Directory files are copied from.
    pub origin: PathBuf,
    /// Directory files are copied to.
    pub destination: PathBuf,
}

/// Encode a path as a single queue line, without the trailing newline.
///
/// Returns `None` if the path cannot be stored on one line.
#[must_use]
pub fn encode_path(path: &Path) -> Option<Cow<'_, [u8]>> {
    #[cfg(unix)]
    let bytes: Cow<'_, [u8]> = {
        use std::os::unix::ffi::OsStrExt;
        Cow::Borrowed(path.as_os_str().as_bytes())
    };

    #[cfg(not(unix))]
    let bytes: Cow<'_, [u8]> = Cow::Borrowed(path.to_str()?.as_bytes());

    if bytes.contains(&b'\n') {
        return None;
    }
    Some(bytes)
}

/// Decode one queue line (trailing newline already removed).
#[must_use]
pub fn decode_path(mut line: Vec<u8>) -> PathBuf {
    if line.last() == Some(&b'\r') {
        line.pop();
    }

    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStringExt;
        PathBuf::from(std::ffi::OsString::from_vec(line))
    }

    #[cfg(not(unix))]
    {
        match String::from_utf8(line) {
            Ok(s) => PathBuf::from(s),
            Err(e) => PathBuf::from(String::from_utf8_lossy(e.as_bytes()).into_owned()),
        }
    }
}

/// Strip leading separators so the path can be joined onto a base directory.
fn as_relative(path: PathBuf) -> PathBuf {
    let mut components = path.components();
    let mut stripped = false;
    while let Some(first) = components.clone().next() {
        match first {
            std::path::Component::RootDir | std::path::Component::Prefix(_) => {
                components.next();
                stripped = true;
            }
            _ => break,
        }
    }
    if stripped {
        components.as_path().to_path_buf()
    } else {
        path
    }
}

/// Writes one queue file.
#[derive(Debug)]
pub struct QueueWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    entries: u64,
}

impl QueueWriter {
    /// Create (or truncate) the queue at `path` and write its header.
    ///
    /// # Errors
    ///
    /// * If the file cannot be created
    /// * If the header cannot be written or a header path cannot be encoded
    pub fn create(path: &Path, header: &QueueHeader) -> Result<Self, QueueError> {
        let file = File::create(path).map_err(|e| QueueError::CreateError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut queue = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            entries: 0,
        };
        queue.write_line(&header.origin)?;
        queue.write_line(&header.destination)?;
        Ok(queue)
    }

    /// Path of the queue file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of relative paths appended so far.
    #[must_use]
    pub const fn entries(&self) -> u64 {
        self.entries
    }

    /// Append one relative path.
    ///
    /// # Errors
    ///
    /// * If the path cannot be encoded as a single line
    /// * If the write fails
    pub fn push(&mut self, relative: &Path) -> Result<(), QueueError> {
        self.write_line(relative)?;
        self.entries += 1;
        Ok(())
    }

    /// Flush buffered lines to disk.
    ///
    /// # Errors
    ///
    /// * If the flush fails
    pub fn finish(mut self) -> Result<u64, QueueError> {
        self.writer.flush().map_err(|e| QueueError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(self.entries)
    }

    fn write_line(&mut self, path: &Path) -> Result<(), QueueError> {
        let line = encode_path(path).ok_or_else(|| QueueError::WriteError {
            path: self.path.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("path cannot be stored on one line: {}", path.display()),
            ),
        })?;

        self.writer
            .write_all(&line)
            .and_then(|()| self.writer.write_all(b"\n"))
            .map_err(|e| QueueError::WriteError {
                path: self.path.clone(),
                source: e,
            })
    }
}

/// Reads one queue file line by line.
#[derive(Debug)]
pub struct QueueReader {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
}

impl QueueReader {
    /// Open the queue at `path`.
    ///
    /// # Errors
    ///
    /// * If the file cannot be opened
    pub fn open(path: &Path) -> Result<Self, QueueError> {
        let file = File::open(path).map_err(|e| QueueError::OpenError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::new(file),
            buf: Vec::new(),
        })
    }

    /// Path of the queue file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the origin and destination lines.
    ///
    /// # Errors
    ///
    /// * If reading fails
    /// * If either header line is missing or empty
    pub fn read_header(&mut self) -> Result<QueueHeader, QueueError> {
        let origin = self.read_raw_line()?.unwrap_or_default();
        if origin.as_os_str().is_empty() {
            return Err(QueueError::MalformedHeader {
                path: self.path.clone(),
                field: "origin",
            });
        }

        let destination = self.read_raw_line()?.unwrap_or_default();
        if destination.as_os_str().is_empty() {
            return Err(QueueError::MalformedHeader {
                path: self.path.clone(),
                field: "destination",
            });
        }

        Ok(QueueHeader {
            origin,
            destination,
        })
    }

    /// Read the next relative path.
    ///
    /// Returns `Ok(None)` at end of queue. Blank lines come back as an empty
    /// path; leading separators are stripped.
    ///
    /// # Errors
    ///
    /// * If reading fails
    pub fn next_entry(&mut self) -> Result<Option<PathBuf>, QueueError> {
        Ok(self.read_raw_line()?.map(as_relative))
    }

    fn read_raw_line(&mut self) -> Result<Option<PathBuf>, QueueError> {
        self.buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .map_err(|e| QueueError::ReadError {
                path: self.path.clone(),
                source: e,
            })?;

        if read == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        Ok(Some(decode_path(std::mem::take(&mut self.buf))))
    }
}

/// Read only the header of the queue at `path`.
///
/// # Errors
///
/// * If the queue cannot be opened or its header is malformed
pub fn read_queue_header(path: &Path) -> Result<QueueHeader, QueueError> {
    QueueReader::open(path)?.read_header()
}
