//! Per-launch session event logs.
//!
//! Every launch gets an append-only text log under the data directory,
//! readable after the launcher process is gone. Writes never fail the
//! caller; a sandbox is not torn down because its log is unwritable.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::warn;

use crate::policy::Policy;

/// Event categories recorded in a session log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EventKind {
    Startup,
    Launch,
    Success,
    Error,
    Warning,
    Info,
    Network,
    Restricted,
    Shutdown,
    Adopted,
}

impl EventKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Startup => "STARTUP",
            Self::Launch => "LAUNCH",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Network => "NETWORK",
            Self::Restricted => "RESTRICTED",
            Self::Shutdown => "SHUTDOWN",
            Self::Adopted => "ADOPTED",
        }
    }
}

/// Handle to one session's log file.
#[derive(Debug, Clone)]
pub(crate) struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    /// Handle to the log for `id` without touching the file.
    pub(crate) fn attach(dir: &Path, id: &str) -> Self {
        Self {
            path: dir.join(format!("session_{id}.log")),
        }
    }

    /// Starts a fresh log with the banner header. `policy` is `None` for
    /// sandboxes adopted from outside this launcher.
    pub(crate) fn create(dir: &Path, id: &str, app_name: &str, policy: Option<Policy>) -> Self {
        let log = Self::attach(dir, id);
        if let Err(err) = fs::create_dir_all(dir) {
            warn!("Could not create log directory: {}", err);
        }

        let rule = "=".repeat(80);
        let policy_label =
            policy.map_or_else(|| "UNKNOWN".to_owned(), |p| p.name().to_uppercase());
        let header = format!(
            "{rule}\nFirepit Sandbox Log - {app_name}\n{rule}\nStart Time: {}\nSecurity Policy: {policy_label}\nSession ID: {id}\n{rule}\n\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
        );
        if let Err(err) = fs::write(&log.path, header) {
            warn!("Could not write session log: {}", err);
        }
        log
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a timestamped event line.
    pub(crate) fn event(&self, kind: EventKind, message: &str) {
        self.append(&format!(
            "[{}] {}: {message}\n",
            Local::now().format("%H:%M:%S"),
            kind.label(),
        ));
    }

    /// Appends an event with an indented detail line below it.
    pub(crate) fn event_with_details(&self, kind: EventKind, message: &str, details: &str) {
        self.append(&format!(
            "[{}] {}: {message}\n  Details: {details}\n",
            Local::now().format("%H:%M:%S"),
            kind.label(),
        ));
    }

    fn append(&self, text: &str) {
        if let Err(err) = append_file(&self.path, text) {
            warn!("Could not write session log: {}", err);
        }
    }
}

fn append_file(path: &Path, text: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    file.write_all(text.as_bytes())
}

/// Generates a 12-character hex session identifier.
pub(crate) fn gen_session_id() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};
    use std::time::{SystemTime, UNIX_EPOCH};

    let mut h = RandomState::new().build_hasher();
    h.write_u64(u64::from(std::process::id()));
    h.write_u128(
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos(),
    );
    format!("{:012x}", h.finish() & 0xffff_ffff_ffff)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn create_writes_the_banner_header() {
        let tmp = tempfile::tempdir().unwrap();
        let log = SessionLog::create(tmp.path(), "abc123def456", "Firefox (firefox)", Some(Policy::Standard));

        let text = fs::read_to_string(log.path()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "=".repeat(80));
        assert_eq!(lines.next().unwrap(), "Firepit Sandbox Log - Firefox (firefox)");
        assert!(text.contains("Security Policy: STANDARD"));
        assert!(text.contains("Session ID: abc123def456"));
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn adopted_sessions_report_an_unknown_policy() {
        let tmp = tempfile::tempdir().unwrap();
        let log = SessionLog::create(tmp.path(), "ffffffffffff", "Sandboxed Application", None);
        let text = fs::read_to_string(log.path()).unwrap();
        assert!(text.contains("Security Policy: UNKNOWN"));
    }

    #[test]
    fn events_append_timestamped_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let log = SessionLog::create(tmp.path(), "0011aabbccdd", "Gedit", Some(Policy::Restrictive));
        log.event(EventKind::Startup, "Initializing sandbox with restrictive policy");
        log.event_with_details(
            EventKind::Launch,
            "Starting application in restrictive sandbox",
            "firejail --net=none gedit",
        );

        let text = fs::read_to_string(log.path()).unwrap();
        assert!(text.contains("] STARTUP: Initializing sandbox with restrictive policy\n"));
        assert!(text.contains("] LAUNCH: Starting application in restrictive sandbox\n"));
        assert!(text.contains("\n  Details: firejail --net=none gedit\n"));
    }

    #[test]
    fn writes_to_an_unwritable_location_do_not_panic() {
        let log = SessionLog::attach(Path::new("/nonexistent/firepit-logs"), "abc");
        log.event(EventKind::Info, "dropped on the floor");
    }

    #[test]
    fn session_ids_are_twelve_hex_chars() {
        let a = gen_session_id();
        let b = gen_session_id();
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
