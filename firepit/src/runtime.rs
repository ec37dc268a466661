//! Sandbox lifecycle management: launch, list, reconcile, terminate.
//!
//! The [`Runtime`] owns the durable registry plus the per-session logs and
//! browser profiles under one data directory. Several firepit processes may
//! share that directory; reconciliation folds their sandboxes together and
//! adopts firejail processes started outside firepit entirely.
//!
//! # Platform
//!
//! This module is only available on Unix.

#![cfg(unix)]
#![allow(unsafe_code)]

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use std::{fmt, fs, io};

use chrono::{Local, Utc};
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

use crate::classify;
use crate::command;
use crate::error::{Error, Result};
use crate::firejail;
use crate::policy::Policy;
use crate::profile::ProfileCatalog;
use crate::registry::{Registry, SandboxRecord};
use crate::session::{EventKind, SessionLog, gen_session_id};
use crate::target::Target;

/// Poll period for pid-only lifecycle monitors.
const POLL_PERIOD: Duration = Duration::from_secs(1);
/// Sample period for the network activity watcher.
const ACTIVITY_PERIOD: Duration = Duration::from_secs(2);
/// Pause between graceful shutdown and the SIGKILL escalation.
const GRACE_PERIOD: Duration = Duration::from_millis(500);
/// Upper bound on one `ss` invocation.
const SS_TIMEOUT: Duration = Duration::from_secs(2);

/// Callback receiving formatted, human-readable progress lines.
pub type LogCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Outcome of a successful launch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Launch {
    /// Host PID of the firejail wrapper process.
    pub pid: u32,
    /// Display message describing the launch.
    pub message: String,
    /// Identifier of the session event log.
    pub session_id: String,
}

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ReconcileSummary {
    /// Records merged in from the durable file.
    pub merged: usize,
    /// Untracked firejail processes adopted.
    pub adopted: usize,
    /// Dead records dropped.
    pub pruned: usize,
}

/// Per-pid results from terminating all sandboxes.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct TerminateSummary {
    /// Pids terminated successfully.
    pub terminated: Vec<u32>,
    /// Pids that failed, with the error text.
    pub failed: Vec<(u32, String)>,
}

/// Counts from one browser-profile cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct PruneSummary {
    /// Profile directories removed.
    pub removed: usize,
    /// Bytes reclaimed.
    pub bytes: u64,
}

/// Severity of a progress message.
#[derive(Debug, Clone, Copy)]
enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    const fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// Shared state behind the [`Runtime`] handle.
struct Inner {
    registry: Registry,
    dir: PathBuf,
    logs_dir: PathBuf,
    profiles: ProfileCatalog,
    /// Pids that currently have a lifecycle monitor task attached.
    monitored: Mutex<HashSet<u32>>,
    callback: Option<LogCallback>,
}

impl Inner {
    /// Fans a progress message out to tracing and the callback.
    fn notify(&self, level: Level, message: &str) {
        match level {
            Level::Info => info!("{}", message),
            Level::Success => info!("✓ {}", message),
            Level::Warning => warn!("{}", message),
            Level::Error => error!("{}", message),
        }
        if let Some(callback) = &self.callback {
            let line = format!(
                "[{}] {} - {message}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level.label(),
            );
            callback(&line);
        }
    }

    fn monitored(&self) -> std::sync::MutexGuard<'_, HashSet<u32>> {
        self.monitored.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Manages the lifecycle of firejail sandboxes.
///
/// Cheap to clone; all clones share one registry and monitor set.
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<Inner>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("dir", &self.inner.dir)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Opens the runtime rooted at `data_dir` without a progress callback.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_callback(data_dir, None)
    }

    /// Opens the runtime rooted at `data_dir`.
    ///
    /// Registry records whose process died since the last run are dropped
    /// up front; the durable file is left alone until the next mutation.
    pub fn with_callback(data_dir: impl AsRef<Path>, callback: Option<LogCallback>) -> Result<Self> {
        let dir = data_dir.as_ref().to_path_buf();
        let registry = Registry::open(&dir)?;
        registry.apply(|records| {
            records.retain(|pid, _| firejail::is_firejail_pid(*pid));
            (false, ())
        });

        let profiles_root =
            ProfileCatalog::default_root().unwrap_or_else(|| dir.join("profiles"));

        Ok(Self {
            inner: Arc::new(Inner {
                registry,
                logs_dir: dir.join("logs"),
                dir,
                profiles: ProfileCatalog::new(profiles_root),
                monitored: Mutex::new(HashSet::new()),
                callback,
            }),
        })
    }

    /// The data directory this runtime is rooted at.
    pub fn data_dir(&self) -> &Path {
        &self.inner.dir
    }

    /// Launches `raw_target` inside a firejail sandbox under `policy`.
    ///
    /// The target may be a file, a directory, an executable path, a bare
    /// command name, or a `file://` URL. The spawned sandbox runs in its
    /// own session and survives this process.
    pub async fn launch(&self, raw_target: &str, policy: Policy) -> Result<Launch> {
        let inner = &self.inner;
        inner.notify(Level::Info, &format!("Preparing to launch: {raw_target}"));
        inner.notify(Level::Info, &format!("Security policy: {policy}"));

        let target = match Target::resolve(raw_target) {
            Ok(target) => target,
            Err(Error::NotFound(path)) => {
                inner.notify(Level::Error, &format!("Path not found: {path}"));
                return Err(Error::NotFound(path));
            }
            Err(err) => return Err(err),
        };
        inner.notify(Level::Info, &format!("Resolved path: {target}"));

        let tool = match firejail::require_tool() {
            Ok(tool) => tool,
            Err(err) => {
                inner.notify(Level::Error, "Firejail is not installed");
                return Err(err);
            }
        };

        let name = classify::display_name(&target);
        inner.notify(Level::Info, &format!("Application: {name}"));

        let session_id = gen_session_id();
        let log = SessionLog::create(&inner.logs_dir, &session_id, &name, Some(policy));
        log.event(
            EventKind::Startup,
            &format!("Initializing sandbox with {policy} policy"),
        );

        let browser_profile = if matches!(&target, Target::Command(c) if classify::is_browser_command(c))
        {
            match inner.profiles.allocate(&session_id) {
                Ok(profile) => {
                    inner.notify(Level::Info, &format!("Created Firefox profile: {profile}"));
                    Some(profile)
                }
                Err(err) => {
                    inner.notify(
                        Level::Warning,
                        &format!("Could not create Firefox profile: {err}"),
                    );
                    None
                }
            }
        } else {
            None
        };

        let built = command::build(&target, policy, browser_profile.as_deref());
        if built.dbus_filtered {
            inner.notify(Level::Info, "Using filtered D-Bus (app requires it)");
        } else {
            inner.notify(Level::Info, "Blocking D-Bus (app does not require it)");
        }
        if let Some(office) = built.office {
            inner.notify(
                Level::Info,
                &format!("Launching LibreOffice directly with {office}"),
            );
        }
        if let Some(profile) = &built.profile {
            inner.notify(Level::Info, &format!("Firefox: Using unique profile {profile}"));
        }

        let command_line = format!("{} {}", tool.display(), built.argv.join(" "));
        inner.notify(Level::Info, &format!("Command: {command_line}"));
        log.event_with_details(
            EventKind::Launch,
            &format!("Starting application in {policy} sandbox"),
            &command_line,
        );

        let mut cmd = Command::new(tool);
        cmd.args(&built.argv)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .current_dir(target.work_dir())
            .kill_on_drop(false);
        // Detach into a fresh session so the sandbox outlives this process.
        // SAFETY: setsid is an async-signal-safe syscall.
        unsafe {
            cmd.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(io::Error::last_os_error());
                }
                Ok(())
            });
        }

        // Spawn and insert under the registry mutex so no reader observes
        // the pid without its record.
        let spawned: io::Result<(u32, Child)> = inner.registry.apply(|records| {
            match cmd.spawn() {
                Ok(child) => match child.id() {
                    Some(pid) => {
                        records.insert(
                            pid,
                            SandboxRecord {
                                pid,
                                name: name.clone(),
                                target: Some(target.to_string()),
                                policy: Some(policy),
                                started_at: Utc::now(),
                                session_id: session_id.clone(),
                            },
                        );
                        (true, Ok((pid, child)))
                    }
                    None => (
                        false,
                        Err(io::Error::other("process exited before it could be tracked")),
                    ),
                },
                Err(err) => (false, Err(err)),
            }
        });
        let (pid, child) = match spawned {
            Ok(pair) => pair,
            Err(err) => {
                let message = format!("Failed to launch process: {err}");
                inner.notify(Level::Error, &message);
                log.event(EventKind::Error, &message);
                return Err(Error::Spawn(err));
            }
        };

        log.event(
            EventKind::Success,
            &format!("Application started successfully (PID: {pid})"),
        );
        let message = format!("Successfully launched {name} (PID: {pid}) in {policy} sandbox");
        inner.notify(Level::Success, &message);

        self.ensure_monitor(pid, Some(child));
        self.watch_activity(pid, policy, log);

        Ok(Launch {
            pid,
            message,
            session_id,
        })
    }

    /// Reconciles the registry with the live set of firejail processes.
    ///
    /// Merges records persisted by other firepit processes, prunes records
    /// whose process is gone, and adopts firejail sandboxes nothing is
    /// tracking. Existing records are never overwritten.
    pub async fn reconcile(&self) -> ReconcileSummary {
        let inner = &self.inner;
        let live = firejail::list_pids().await;
        let disk = inner.registry.read_disk();

        let (summary, merged, pruned, adopted) = inner.registry.apply(|records| {
            let mut summary = ReconcileSummary::default();
            let mut merged = Vec::new();
            let mut pruned = Vec::new();
            let mut adopted = Vec::new();

            for (pid, record) in disk {
                if !records.contains_key(&pid) && firejail::is_firejail_pid(pid) {
                    merged.push(record.clone());
                    records.insert(pid, record);
                    summary.merged += 1;
                }
            }

            records.retain(|pid, _| {
                if live.contains(pid) || firejail::is_firejail_pid(*pid) {
                    true
                } else {
                    pruned.push(*pid);
                    false
                }
            });
            summary.pruned = pruned.len();

            for pid in &live {
                if records.contains_key(pid) {
                    continue;
                }
                let name = firejail::cmdline(*pid)
                    .map(|c| classify::name_from_cmdline(&c))
                    .unwrap_or_else(|| format!("Firejail Process (PID {pid})"));
                let record = SandboxRecord {
                    pid: *pid,
                    name,
                    target: None,
                    policy: None,
                    started_at: Utc::now(),
                    session_id: gen_session_id(),
                };
                adopted.push(record.clone());
                records.insert(*pid, record);
                summary.adopted += 1;
            }

            let changed = summary.merged > 0 || summary.pruned > 0 || summary.adopted > 0;
            (changed, (summary, merged, pruned, adopted))
        });

        for record in &merged {
            inner.notify(
                Level::Info,
                &format!("Detected external sandbox: {} (PID: {})", record.name, record.pid),
            );
        }
        for pid in &pruned {
            inner.notify(Level::Info, &format!("Cleaning up dead process: {pid}"));
        }
        for record in &adopted {
            inner.notify(
                Level::Info,
                &format!("Detected untracked firejail: {} (PID: {})", record.name, record.pid),
            );
            SessionLog::create(&inner.logs_dir, &record.session_id, &record.name, None).event(
                EventKind::Adopted,
                &format!("Adopted running sandbox (PID: {})", record.pid),
            );
        }

        for pid in inner.registry.pids() {
            self.ensure_monitor(pid, None);
        }

        summary
    }

    /// Reconciles, then returns all live sandbox records, oldest first.
    pub async fn active(&self) -> Vec<SandboxRecord> {
        self.reconcile().await;
        self.inner.registry.snapshot()
    }

    /// Terminates the sandbox with `pid`: graceful firejail shutdown,
    /// then SIGKILL if it is still alive half a second later.
    ///
    /// A live firejail process without a record is killed under a generic
    /// name; any other unknown pid is [`Error::UnknownPid`] and is never
    /// signaled.
    pub async fn terminate(&self, pid: u32) -> Result<String> {
        let inner = &self.inner;
        let record = inner.registry.get(pid);
        let name = match &record {
            Some(record) => record.name.clone(),
            None => {
                if !firejail::is_firejail_pid(pid) {
                    return Err(Error::UnknownPid(pid));
                }
                format!("Process {pid}")
            }
        };

        if let Some(record) = &record {
            SessionLog::attach(&inner.logs_dir, &record.session_id)
                .event(EventKind::Shutdown, "Sandbox terminated by user");
            if !firejail::is_pid_alive(pid) {
                inner.registry.remove(pid);
                return Ok(format!("Process {pid} already terminated"));
            }
        }

        firejail::shutdown(pid).await;
        inner.notify(Level::Info, &format!("Sent shutdown to {name} (PID: {pid})"));

        sleep(GRACE_PERIOD).await;

        if firejail::is_pid_alive(pid) {
            firejail::kill_force(pid);
            inner.notify(Level::Info, &format!("Sent SIGKILL to {name} (PID: {pid})"));
        }

        inner.registry.remove(pid);
        Ok(format!("Terminated {name} (PID: {pid})"))
    }

    /// Reconciles, then terminates every tracked sandbox.
    pub async fn terminate_all(&self) -> TerminateSummary {
        self.reconcile().await;
        let mut pids = self.inner.registry.pids();
        pids.sort_unstable();

        let mut summary = TerminateSummary::default();
        for pid in pids {
            match self.terminate(pid).await {
                Ok(_) => summary.terminated.push(pid),
                Err(err) => summary.failed.push((pid, err.to_string())),
            }
        }
        summary
    }

    /// Removes browser profiles that no live sandbox references.
    pub async fn prune_profiles(&self) -> PruneSummary {
        let live = firejail::list_pids().await;
        let cmdlines: Vec<String> = live
            .iter()
            .filter_map(|pid| firejail::cmdline(*pid))
            .collect();
        let (removed, bytes) = self.inner.profiles.prune(&cmdlines);
        PruneSummary { removed, bytes }
    }

    /// Contents of the session event log for `pid`.
    pub fn session_log(&self, pid: u32) -> Result<String> {
        let record = self
            .inner
            .registry
            .get(pid)
            .ok_or(Error::UnknownPid(pid))?;
        let log = SessionLog::attach(&self.inner.logs_dir, &record.session_id);
        Ok(fs::read_to_string(log.path())?)
    }

    /// Attaches a lifecycle monitor task for `pid` unless one is running.
    ///
    /// Monitors launched with the [`Child`] wait for the real exit; pid-only
    /// monitors (adopted or merged sandboxes) poll liveness instead.
    fn ensure_monitor(&self, pid: u32, child: Option<Child>) {
        if !self.inner.monitored().insert(pid) {
            return;
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match child {
                Some(mut child) => {
                    let _ = child.wait().await;
                }
                None => {
                    while firejail::is_firejail_pid(pid) {
                        sleep(POLL_PERIOD).await;
                    }
                }
            }
            settle(&inner, pid);
        });
    }

    /// Samples network activity into the session log until the process dies.
    fn watch_activity(&self, pid: u32, policy: Policy, log: SessionLog) {
        tokio::spawn(async move {
            if policy == Policy::Restrictive {
                log.event(EventKind::Restricted, "Network access blocked by policy");
                log.event(EventKind::Info, "Application is running in restricted mode");
                return;
            }
            let mut connected = false;
            while firejail::is_firejail_pid(pid) {
                sleep(ACTIVITY_PERIOD).await;
                let active = connection_active(pid).await;
                if active && !connected {
                    log.event(EventKind::Network, "Network connection established");
                }
                connected = active;
            }
        });
    }
}

/// Cleans up after a monitored process exits: deregisters the monitor,
/// drops the record, and logs the runtime. A missing record means the
/// sandbox was already terminated explicitly; nothing is logged then.
fn settle(inner: &Inner, pid: u32) {
    inner.monitored().remove(&pid);

    let Some(record) = inner.registry.remove(pid) else {
        return;
    };
    let elapsed = elapsed_secs(&record);
    inner.notify(
        Level::Info,
        &format!("Application closed: {} (ran for {elapsed:.1}s)", record.name),
    );
    SessionLog::attach(&inner.logs_dir, &record.session_id).event(
        EventKind::Shutdown,
        &format!("Application closed after {elapsed:.1}s"),
    );
}

#[allow(clippy::cast_precision_loss)]
fn elapsed_secs(record: &SandboxRecord) -> f64 {
    (Utc::now() - record.started_at).num_milliseconds().max(0) as f64 / 1000.0
}

/// Whether `ss -tunp` lists a socket owned by `pid`. Any failure counts
/// as no activity.
async fn connection_active(pid: u32) -> bool {
    let result = timeout(SS_TIMEOUT, Command::new("ss").arg("-tunp").output()).await;
    let Ok(Ok(output)) = result else {
        return false;
    };
    let needle = format!("pid={pid},");
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .any(|line| line.contains(&needle))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Linux caps pids at 4194304 (PID_MAX_LIMIT); these can never be alive.
    const DEAD_PID: u32 = 5_000_000;
    const OTHER_DEAD_PID: u32 = 4_999_999;

    fn stale_record(pid: u32) -> SandboxRecord {
        SandboxRecord {
            pid,
            name: "Gedit".to_owned(),
            target: Some("/usr/bin/gedit".to_owned()),
            policy: Some(Policy::Standard),
            started_at: Utc::now(),
            session_id: gen_session_id(),
        }
    }

    #[tokio::test]
    async fn launch_of_a_missing_target_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let rt = Runtime::open(tmp.path()).unwrap();
        let err = rt
            .launch("/no/such/place/firepit-test", Policy::Standard)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(path) if path == "/no/such/place/firepit-test"));
    }

    #[tokio::test]
    async fn launch_without_the_tool_is_an_error() {
        if firejail::tool_path().is_some() {
            return; // host has firejail; covered by end-to-end runs instead
        }
        let tmp = tempfile::tempdir().unwrap();
        let rt = Runtime::open(tmp.path()).unwrap();
        let err = rt
            .launch(&tmp.path().display().to_string(), Policy::Standard)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolMissing));
    }

    #[tokio::test]
    async fn launch_reports_progress_through_the_callback() {
        let tmp = tempfile::tempdir().unwrap();
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let rt = Runtime::with_callback(
            tmp.path(),
            Some(Box::new(move |line: &str| {
                sink.lock().unwrap().push(line.to_owned());
            })),
        )
        .unwrap();

        let _ = rt.launch("/no/such/place/firepit-test", Policy::Restrictive).await;

        let lines = lines.lock().unwrap();
        assert!(lines.iter().any(|l| l.contains("INFO - Preparing to launch: /no/such/place/firepit-test")));
        assert!(lines.iter().any(|l| l.contains("INFO - Security policy: restrictive")));
        assert!(lines.iter().any(|l| l.contains("ERROR - Path not found: /no/such/place/firepit-test")));
    }

    #[tokio::test]
    async fn terminate_of_an_unknown_dead_pid_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let rt = Runtime::open(tmp.path()).unwrap();
        let err = rt.terminate(DEAD_PID).await.unwrap_err();
        assert!(matches!(err, Error::UnknownPid(pid) if pid == DEAD_PID));
    }

    #[tokio::test]
    async fn terminate_of_a_stale_record_reports_already_terminated() {
        let tmp = tempfile::tempdir().unwrap();
        let rt = Runtime::open(tmp.path()).unwrap();
        rt.inner.registry.insert(stale_record(DEAD_PID));

        let message = rt.terminate(DEAD_PID).await.unwrap();
        assert_eq!(message, format!("Process {DEAD_PID} already terminated"));
        assert!(rt.inner.registry.get(DEAD_PID).is_none());
    }

    #[tokio::test]
    async fn terminate_refuses_live_processes_outside_firejail() {
        let tmp = tempfile::tempdir().unwrap();
        let rt = Runtime::open(tmp.path()).unwrap();

        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();

        let err = rt.terminate(pid).await.unwrap_err();
        assert!(matches!(err, Error::UnknownPid(p) if p == pid));
        // Still running: terminate must not have signaled it.
        assert!(child.try_wait().unwrap().is_none());

        child.kill().unwrap();
        let _ = child.wait();
    }

    #[tokio::test]
    async fn terminate_succeeds_exactly_once() {
        let tmp = tempfile::tempdir().unwrap();
        let rt = Runtime::open(tmp.path()).unwrap();
        rt.inner.registry.insert(stale_record(DEAD_PID));

        assert!(rt.terminate(DEAD_PID).await.is_ok());
        let err = rt.terminate(DEAD_PID).await.unwrap_err();
        assert!(matches!(err, Error::UnknownPid(pid) if pid == DEAD_PID));
    }

    #[tokio::test]
    async fn reconcile_prunes_dead_records() {
        let tmp = tempfile::tempdir().unwrap();
        let rt = Runtime::open(tmp.path()).unwrap();
        rt.inner.registry.insert(stale_record(DEAD_PID));
        rt.inner.registry.insert(stale_record(OTHER_DEAD_PID));

        let summary = rt.reconcile().await;
        assert_eq!(summary.pruned, 2);
        assert_eq!(summary.merged, 0);
        assert!(rt.inner.registry.pids().is_empty());
    }

    #[tokio::test]
    async fn reconcile_ignores_dead_records_from_other_processes() {
        let tmp = tempfile::tempdir().unwrap();
        let rt = Runtime::open(tmp.path()).unwrap();

        // Another process persisted a record and then its sandbox died.
        let other = Registry::open(tmp.path()).unwrap();
        other.insert(stale_record(DEAD_PID));

        let summary = rt.reconcile().await;
        assert_eq!(summary, ReconcileSummary::default());
        assert!(rt.inner.registry.pids().is_empty());
    }

    #[tokio::test]
    async fn a_second_reconcile_changes_nothing() {
        fn contents(rt: &Runtime) -> Vec<(u32, String, chrono::DateTime<Utc>)> {
            rt.inner
                .registry
                .snapshot()
                .into_iter()
                .map(|r| (r.pid, r.session_id, r.started_at))
                .collect()
        }

        let tmp = tempfile::tempdir().unwrap();
        let rt = Runtime::open(tmp.path()).unwrap();
        rt.inner.registry.insert(stale_record(DEAD_PID));
        rt.inner.registry.insert(stale_record(OTHER_DEAD_PID));

        rt.reconcile().await;
        let first = contents(&rt);

        let summary = rt.reconcile().await;
        assert_eq!(summary, ReconcileSummary::default());
        assert_eq!(contents(&rt), first);
    }

    #[tokio::test]
    async fn session_log_of_an_unknown_pid_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let rt = Runtime::open(tmp.path()).unwrap();
        assert!(matches!(rt.session_log(DEAD_PID), Err(Error::UnknownPid(_))));
    }
}
