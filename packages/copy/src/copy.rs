//! Single-file copy with overwrite semantics.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::CopyError;

/// Result of copying one queued file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCopyOutcome {
    /// The file was copied.
    Copied {
        /// Size of the source file in bytes.
        bytes: u64,
    },
    /// Source does not exist, skipped.
    SourceNotFound,
    /// Source exists but is not a regular file, skipped.
    NotRegularFile,
}

/// Copy one file, overwriting the target if it exists.
///
/// Symlinks are followed. The target's parent directory is created if it is
/// missing.
///
/// # Arguments
///
/// * `source` - Source file path
/// * `target` - Target file path
///
/// # Errors
///
/// * If the source metadata cannot be read for a reason other than absence
/// * If the parent directory cannot be created
/// * If the copy operation fails
pub fn copy_file(source: &Path, target: &Path) -> Result<FileCopyOutcome, CopyError> {
    log::trace!("Copying file: {} -> {}", source.display(), target.display());

    let metadata = match fs::metadata(source) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("Source does not exist: {}", source.display());
            return Ok(FileCopyOutcome::SourceNotFound);
        }
        Err(e) => {
            return Err(CopyError::MetadataError {
                path: source.to_path_buf(),
                io_error: e,
            });
        }
    };

    if !metadata.is_file() {
        log::debug!("Source is not a regular file: {}", source.display());
        return Ok(FileCopyOutcome::NotRegularFile);
    }

    if let Some(parent) = target.parent() {
        if !parent.is_dir() {
            fs::create_dir_all(parent).map_err(|e| CopyError::CreateDirError {
                path: parent.to_path_buf(),
                io_error: e,
            })?;
        }
    }

    copy_file_with_reflink(source, target)?;

    Ok(FileCopyOutcome::Copied {
        bytes: metadata.len(),
    })
}

/// Copy a single file, trying reflink first then falling back to regular copy.
fn copy_file_with_reflink(source: &Path, target: &Path) -> Result<(), CopyError> {
    // Reflink refuses existing targets, so overwrites always take the fallback
    match reflink_copy::reflink(source, target) {
        Ok(()) => {
            log::trace!("Reflinked {} -> {}", source.display(), target.display());
            Ok(())
        }
        Err(_) => {
            fs::copy(source, target).map_err(|e| CopyError::FileCopyError {
                source_path: source.to_path_buf(),
                target_path: target.to_path_buf(),
                io_error: e,
            })?;
            log::trace!("Copied {} -> {}", source.display(), target.display());
            Ok(())
        }
    }
}
