//! Probes and control invocations for the host firejail binary.
//!
//! Everything here is bounded: control invocations get a 5 s timeout, and
//! liveness checks go through `kill(pid, 0)` plus `/proc` rather than the
//! tool itself wherever possible.

#![allow(unsafe_code)]

use std::fs;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

use crate::error::{Error, Result};

/// Upper bound on any firejail control invocation.
const TOOL_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolved path of the firejail binary, or `None` if it is not installed.
pub fn tool_path() -> Option<&'static Path> {
    #[cfg(target_os = "linux")]
    {
        firepit_firejail::path()
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// [`tool_path`], but an error when the binary is missing.
pub(crate) fn require_tool() -> Result<&'static Path> {
    tool_path().ok_or(Error::ToolMissing)
}

/// First line of `firejail --version`, or `None` if the tool is missing
/// or unresponsive.
pub async fn tool_version() -> Option<String> {
    let tool = tool_path()?;
    let output = timeout(TOOL_TIMEOUT, Command::new(tool).arg("--version").output())
        .await
        .ok()?
        .ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next()?.trim();
    (!first.is_empty()).then(|| first.to_owned())
}

/// Pids of running firejail sandboxes, from `firejail --list`.
///
/// Tool missing, failure, and timeout all degrade to an empty list;
/// callers fall back to direct liveness probes.
pub(crate) async fn list_pids() -> Vec<u32> {
    let Some(tool) = tool_path() else {
        return Vec::new();
    };
    match timeout(TOOL_TIMEOUT, Command::new(tool).arg("--list").output()).await {
        Ok(Ok(output)) => parse_list(&String::from_utf8_lossy(&output.stdout)),
        Ok(Err(err)) => {
            warn!("Could not run firejail --list: {}", err);
            Vec::new()
        }
        Err(_) => {
            warn!("firejail --list timed out");
            Vec::new()
        }
    }
}

/// Parses `--list` output lines of the form `<pid>:<user>:<command>`.
/// Lines flagged as zombies are skipped.
fn parse_list(stdout: &str) -> Vec<u32> {
    let mut pids = Vec::new();
    for line in stdout.lines() {
        if line.to_lowercase().contains("zombie") {
            continue;
        }
        let Some((head, _)) = line.trim_start().split_once(':') else {
            continue;
        };
        if let Ok(pid) = head.parse() {
            pids.push(pid);
        }
    }
    pids
}

/// Asks firejail to shut the sandbox down gracefully. Best-effort: the
/// caller escalates to SIGKILL if the process is still alive afterwards.
pub(crate) async fn shutdown(pid: u32) {
    let Some(tool) = tool_path() else {
        return;
    };
    let _ = timeout(
        TOOL_TIMEOUT,
        Command::new(tool)
            .arg(format!("--shutdown={pid}"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status(),
    )
    .await;
}

/// Checks if a process is alive via `kill(pid, 0)`.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn is_pid_alive(pid: u32) -> bool {
    // SAFETY: kill(2) with signal 0 performs error checking only; no
    // signal is delivered.
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

/// Sends `SIGKILL` to the process.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn kill_force(pid: u32) {
    // SAFETY: no pointers involved; the worst outcome of a stale pid is
    // ESRCH, which is ignored.
    unsafe {
        libc::kill(pid as i32, libc::SIGKILL);
    }
}

/// The process's command line with NUL separators flattened to spaces.
pub(crate) fn cmdline(pid: u32) -> Option<String> {
    let raw = fs::read(format!("/proc/{pid}/cmdline")).ok()?;
    let text = String::from_utf8_lossy(&raw).replace('\0', " ");
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Whether `pid` is a live process whose command line mentions firejail.
pub(crate) fn is_firejail_pid(pid: u32) -> bool {
    if !is_pid_alive(pid) {
        return false;
    }
    cmdline(pid).is_some_and(|c| c.contains("firejail"))
}
