//! Round-robin partitioning of an origin tree into queue files.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::path::Path;

use crate::error::QueueError;
use crate::format::{QueueHeader, QueueWriter, encode_path};
use crate::location::QueueLocation;

/// Totals gathered while partitioning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionStats {
    /// Sum of the sizes of all queued files, in bytes.
    pub scope_size: u64,
    /// Number of queued files.
    pub file_num: u64,
    /// Entries that could not be read and were left out.
    pub skipped: u64,
}

/// Write `queue_count` queues for copying `origin` into `destination`.
///
/// Every regular file under `origin` (including symlinks that resolve to a
/// regular file) is appended to queue `n % queue_count`, where `n` is its
/// position in traversal order. Entries that cannot be read are logged and
/// skipped. The walk is serial.
///
/// # Errors
///
/// * If `origin` cannot be listed
/// * If a queue file cannot be created or written
pub fn partition_tree(
    location: &QueueLocation,
    origin: &Path,
    destination: &Path,
    queue_count: u32,
) -> Result<PartitionStats, QueueError> {
    log::debug!(
        "Partitioning {} into {} queues in {}",
        origin.display(),
        queue_count,
        location.dir().display()
    );

    // An unreadable root aborts planning; unreadable children are skipped.
    fs::read_dir(origin).map_err(|e| QueueError::OriginUnreadable {
        path: origin.to_path_buf(),
        source: e,
    })?;

    let header = QueueHeader {
        origin: origin.to_path_buf(),
        destination: destination.to_path_buf(),
    };
    let mut queues = location
        .queue_paths(queue_count)
        .map(|path| QueueWriter::create(&path, &header))
        .collect::<Result<Vec<_>, _>>()?;

    let mut stats = PartitionStats::default();

    for entry in jwalk::WalkDir::new(origin)
        .skip_hidden(false)
        .follow_links(false)
        .sort(false)
        .parallelism(jwalk::Parallelism::Serial)
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry under {}: {e}", origin.display());
                stats.skipped += 1;
                continue;
            }
        };

        if entry.file_type().is_dir() {
            if let Some(e) = &entry.read_children_error {
                log::warn!("Skipping unreadable directory {}: {e}", entry.path().display());
                stats.skipped += 1;
            }
            continue;
        }

        let path = entry.path();
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                stats.skipped += 1;
                continue;
            }
        };
        if !metadata.is_file() {
            log::trace!("Not a regular file: {}", path.display());
            continue;
        }

        let Ok(relative) = path.strip_prefix(origin) else {
            log::warn!("Skipping {}: outside of origin", path.display());
            stats.skipped += 1;
            continue;
        };
        if encode_path(relative).is_none() {
            log::warn!(
                "Skipping {}: name cannot be stored in a queue",
                path.display()
            );
            stats.skipped += 1;
            continue;
        }

        #[allow(clippy::cast_possible_truncation)]
        let index = (stats.file_num % u64::from(queue_count)) as usize;
        queues[index].push(relative)?;
        stats.scope_size += metadata.len();
        stats.file_num += 1;
    }

    for queue in queues {
        queue.finish()?;
    }

    log::debug!(
        "Partitioned {} files ({} bytes), skipped {}",
        stats.file_num,
        stats.scope_size,
        stats.skipped
    );

    Ok(stats)
}
