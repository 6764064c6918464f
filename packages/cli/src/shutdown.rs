//! Ctrl-C handling.
//!
//! SIGINT only raises a flag. The progress loop polls it and cancels the
//! run, so workers finish their current file and queues still get removed.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

#[cfg(any(unix, test))]
fn raise(flag: &AtomicBool) {
    flag.store(true, Ordering::SeqCst);
}

#[cfg(unix)]
extern "C" fn on_sigint(_signal: libc::c_int) {
    raise(&SHUTDOWN_REQUESTED);
}

/// Route SIGINT to the shutdown flag.
///
/// # Errors
///
/// * If the handler cannot be installed
#[cfg(unix)]
pub fn install_handler() -> std::io::Result<()> {
    let handler = on_sigint as extern "C" fn(libc::c_int);

    // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
    let previous = unsafe { libc::signal(libc::SIGINT, handler as libc::sighandler_t) };
    if previous == libc::SIG_ERR {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// No-op where SIGINT is not available; Ctrl-C keeps its default behavior.
///
/// # Errors
///
/// * Never
#[cfg(not(unix))]
pub const fn install_handler() -> std::io::Result<()> {
    Ok(())
}

/// Whether a shutdown was requested.
#[must_use]
pub fn is_shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}
