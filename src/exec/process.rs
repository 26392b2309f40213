// src/exec/process.rs

//! Spawning a single command as the leader of its own process group, and
//! killing that whole group on cancellation.
//!
//! Killing only the direct child would leave its descendants (the server a
//! `make run` started, for example) running; signalling the group takes
//! the entire subtree down.

use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::errors::{LeafError, Result};
use crate::exec::command::CommandSpec;

/// How a single command ended.
#[derive(Debug)]
pub enum ProcessExit {
    Exited(ExitStatus),
    /// Cancelled; the process group has been killed and the child reaped.
    Killed,
}

/// Spawn `spec` with inherited stdio in a fresh process group.
pub fn spawn(spec: &CommandSpec) -> Result<Child> {
    let mut cmd = Command::new(spec.executable());
    cmd.args(spec.args())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(0);

    cmd.spawn().map_err(|source| LeafError::Spawn {
        command: spec.to_string(),
        source,
    })
}

/// Wait for `child` to exit, or kill its whole process group when `cancel`
/// fires first.
pub async fn wait_or_kill(mut child: Child, cancel: &CancellationToken) -> Result<ProcessExit> {
    // Grab the pid before waiting: it is gone once the child is reaped.
    let pid = child.id();

    tokio::select! {
        status = child.wait() => Ok(ProcessExit::Exited(status?)),
        _ = cancel.cancelled() => {
            match pid {
                Some(pid) => kill_tree(pid).await,
                None => debug!("child already reaped before cancellation"),
            }
            // Make sure the direct child is gone before reporting back.
            if let Err(e) = child.kill().await {
                debug!(error = %e, "child already exited after group kill");
            }
            Ok(ProcessExit::Killed)
        }
    }
}

#[cfg(unix)]
async fn kill_tree(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        warn!(pid, "pid does not fit pid_t; cannot signal process group");
        return;
    };

    // The child leads its own group, so its pid is the group id.
    // SAFETY: kill(2) takes no pointers; a negative pid addresses the group.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        // ESRCH: the whole group already exited.
        if err.raw_os_error() != Some(libc::ESRCH) {
            warn!(pid, error = %err, "failed to kill process group");
        }
    } else {
        debug!(pgid, "killed process group");
    }
}

#[cfg(windows)]
async fn kill_tree(pid: u32) {
    // No process groups here: let taskkill walk the tree.
    let res = Command::new("taskkill")
        .args(["/T", "/F", "/PID", &pid.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    match res {
        Ok(status) if status.success() => debug!(pid, "killed process tree"),
        Ok(status) => debug!(pid, ?status, "taskkill reported failure; tree may already be gone"),
        Err(e) => warn!(pid, error = %e, "failed to run taskkill"),
    }
}

#[cfg(not(any(unix, windows)))]
async fn kill_tree(pid: u32) {
    debug!(pid, "no subtree kill on this platform; killing direct child only");
}
