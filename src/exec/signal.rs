// src/exec/signal.rs

//! Polite termination of a child process.

use std::io;

use tokio::process::Child;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Send a termination request to `child` without waiting for it to exit.
///
/// On Unix this is SIGTERM, so the downloader can clean up partial files. On
/// other platforms there is no graceful equivalent and the process is killed.
/// A child that has already been reaped, or is already gone, is not an error.
#[cfg(unix)]
pub fn request_termination(child: &mut Child) -> io::Result<()> {
    let Some(pid) = child.id() else {
        return Ok(());
    };

    match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(not(unix))]
pub fn request_termination(child: &mut Child) -> io::Result<()> {
    match child.start_kill() {
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
        other => other,
    }
}
