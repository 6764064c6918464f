//! Free space checks on the destination volume.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::io;
use std::path::Path;

/// Whether the volume holding `destination` has at least `needed_bytes`
/// available.
///
/// Fails closed: an empty path or a failed query gives `false`.
#[must_use]
pub fn is_enough_space(destination: &Path, needed_bytes: u64) -> bool {
    if destination.as_os_str().is_empty() {
        return false;
    }

    match available_space(destination) {
        Ok(available) => {
            log::debug!(
                "{} bytes available at {}, {needed_bytes} needed",
                available,
                destination.display()
            );
            available >= needed_bytes
        }
        Err(e) => {
            log::warn!(
                "Cannot query free space at {}: {e}",
                destination.display()
            );
            false
        }
    }
}

/// Bytes available to unprivileged users on the volume holding `path`.
///
/// # Errors
///
/// * If the path contains a NUL byte
/// * If `statvfs` fails (for example, the path does not exist)
#[cfg(unix)]
#[allow(clippy::useless_conversion)]
pub fn available_space(path: &Path) -> io::Result<u64> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();

    // SAFETY: `c_path` is NUL-terminated and `stat` points to writable
    // memory large enough for a `statvfs`.
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: `statvfs` returned 0, so it filled in the struct.
    let stat = unsafe { stat.assume_init() };

    Ok(u64::from(stat.f_bavail).saturating_mul(u64::from(stat.f_frsize)))
}

/// Bytes available on the volume holding `path`.
///
/// # Errors
///
/// * Always: free space queries are only implemented on Unix
#[cfg(not(unix))]
pub fn available_space(path: &Path) -> io::Result<u64> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("free space query not supported for {}", path.display()),
    ))
}
