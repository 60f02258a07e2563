//! Child process primitives.
//!
//! Spawning, exit code normalization, graceful termination and the platform
//! browser opener. Orchestration lives in `crate::orchestrator`.

mod browser;
mod launcher;
mod runner;

pub use browser::{open_url, OpenUrl, SystemBrowser};
pub use launcher::{spawn_app, AppHandle, Launch, StreamlitLauncher};
pub use runner::run_command;

use std::process::ExitStatus;

/// Normalize an exit status to an integer code.
///
/// Processes killed by a signal report the negated signal number.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return -sig;
        }
    }
    -1
}

/// Ask a child to shut down without forcing it.
///
/// Sends SIGTERM on unix. Elsewhere there is no graceful equivalent, so the
/// child is killed.
pub fn request_termination(child: &mut tokio::process::Child) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        // Already reaped.
        let Some(pid) = child.id() else {
            return Ok(());
        };
        nix::sys::signal::kill(
            nix::unistd::Pid::from_raw(pid as i32),
            nix::sys::signal::Signal::SIGTERM,
        )
        .map_err(std::io::Error::from)
    }
    #[cfg(not(unix))]
    {
        child.start_kill()
    }
}
