//! Durable sandbox records and JSON persistence.
//!
//! The registry file is shared between every firepit process on the
//! machine, so reads take a shared flock and writes go through an
//! exclusive flock plus a temp-file rename. In-memory state is
//! authoritative between persists; a failed write is logged and healed
//! by the next successful one.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::policy::Policy;

/// Registry file name under the data directory.
const REGISTRY_FILE: &str = "sandboxes.json";
/// Advisory lock file guarding cross-process registry access.
const REGISTRY_LOCK: &str = "sandboxes.lock";

/// Persisted state of one managed sandbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct SandboxRecord {
    /// Host PID of the firejail wrapper process.
    pub pid: u32,
    /// Human-readable application name.
    pub name: String,
    /// Normalized launch target. `None` for adopted sandboxes.
    pub target: Option<String>,
    /// Security policy the sandbox was launched under. `None` for
    /// adopted sandboxes.
    pub policy: Option<Policy>,
    /// Timestamp when the sandbox was started.
    pub started_at: DateTime<Utc>,
    /// Short hex identifier tying the record to its session log.
    pub session_id: String,
}

impl SandboxRecord {
    /// Whole seconds since the sandbox started.
    pub fn uptime_secs(&self) -> u64 {
        u64::try_from((Utc::now() - self.started_at).num_seconds()).unwrap_or(0)
    }
}

/// Pid-keyed record store backed by one JSON file.
#[derive(Debug)]
pub struct Registry {
    file: PathBuf,
    lock: PathBuf,
    records: Mutex<HashMap<u32, SandboxRecord>>,
}

impl Registry {
    /// Opens the registry in `dir`, creating the directory if needed.
    ///
    /// A corrupt or unreadable registry file loads as empty with a
    /// warning rather than failing.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let file = dir.join(REGISTRY_FILE);
        let lock = dir.join(REGISTRY_LOCK);
        let records = read_file(&file, &lock);
        Ok(Self {
            file,
            lock,
            records: Mutex::new(records),
        })
    }

    /// Runs `f` against the record map under the mutex and persists the
    /// map when `f` reports a change. Persistence failures are logged;
    /// the in-memory mutation stands either way.
    pub(crate) fn apply<R>(&self, f: impl FnOnce(&mut HashMap<u32, SandboxRecord>) -> (bool, R)) -> R {
        let mut records = self.guard();
        let (changed, out) = f(&mut records);
        if changed && let Err(err) = self.persist(&records) {
            warn!("Could not persist registry: {}", err);
        }
        out
    }

    /// Adds or replaces the record for its pid and persists.
    pub fn insert(&self, record: SandboxRecord) {
        self.apply(|records| {
            records.insert(record.pid, record);
            (true, ())
        });
    }

    /// Removes and returns the record for `pid`, persisting on a hit.
    pub fn remove(&self, pid: u32) -> Option<SandboxRecord> {
        self.apply(|records| match records.remove(&pid) {
            Some(record) => (true, Some(record)),
            None => (false, None),
        })
    }

    /// Clone of the record for `pid`, if tracked.
    pub fn get(&self, pid: u32) -> Option<SandboxRecord> {
        self.guard().get(&pid).cloned()
    }

    /// Tracked pids in no particular order.
    pub fn pids(&self) -> Vec<u32> {
        self.guard().keys().copied().collect()
    }

    /// Clones of all records, oldest launch first.
    pub fn snapshot(&self) -> Vec<SandboxRecord> {
        let mut records: Vec<_> = self.guard().values().cloned().collect();
        records.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.pid.cmp(&b.pid)));
        records
    }

    /// Re-reads the durable file, bypassing in-memory state. Used to pick
    /// up sandboxes launched by other firepit processes.
    pub(crate) fn read_disk(&self) -> HashMap<u32, SandboxRecord> {
        read_file(&self.file, &self.lock)
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<u32, SandboxRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, records: &HashMap<u32, SandboxRecord>) -> io::Result<()> {
        let _flock = exclusive_lock(&self.lock);
        let tmp = self.file.with_extension("json.tmp");
        let file = File::create(&tmp)?;
        serde_json::to_writer_pretty(file, records).map_err(io::Error::other)?;
        fs::rename(&tmp, &self.file)
    }
}

/// Reads the registry file under a shared flock. Missing, unreadable, and
/// corrupt files all load as empty; only corruption warrants a warning.
fn read_file(file: &Path, lock: &Path) -> HashMap<u32, SandboxRecord> {
    let _flock = shared_lock(lock);
    match fs::read_to_string(file) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(records) => records,
            Err(err) => {
                warn!("Registry file is corrupt, starting empty: {}", err);
                HashMap::new()
            }
        },
        Err(err) if err.kind() == io::ErrorKind::NotFound => HashMap::new(),
        Err(err) => {
            warn!("Could not read registry file: {}", err);
            HashMap::new()
        }
    }
}

// The flock handles release on drop (close releases the lock). Lock
// acquisition is best-effort: a failure degrades to unserialized access,
// which is still atomic at the file level thanks to the rename.

fn lock_handle(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
}

fn shared_lock(path: &Path) -> Option<File> {
    let file = lock_handle(path).ok()?;
    file.lock_shared().ok()?;
    Some(file)
}

fn exclusive_lock(path: &Path) -> Option<File> {
    let file = lock_handle(path).ok()?;
    file.lock_exclusive().ok()?;
    Some(file)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn record(pid: u32, name: &str, started_secs_ago: i64) -> SandboxRecord {
        SandboxRecord {
            pid,
            name: name.to_owned(),
            target: Some(format!("/usr/bin/{}", name.to_lowercase())),
            policy: Some(Policy::Standard),
            started_at: Utc::now() - Duration::seconds(started_secs_ago),
            session_id: "abc123def456".to_owned(),
        }
    }

    #[test]
    fn open_on_an_empty_directory_starts_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = Registry::open(tmp.path()).unwrap();
        assert!(registry.snapshot().is_empty());
        assert!(!tmp.path().join(REGISTRY_FILE).exists());
    }

    #[test]
    fn insert_persists_records_keyed_by_pid() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = Registry::open(tmp.path()).unwrap();
        registry.insert(record(4242, "Gedit", 0));

        let raw = fs::read_to_string(tmp.path().join(REGISTRY_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["4242"]["name"], "Gedit");
        assert_eq!(value["4242"]["pid"], 4242);
        assert_eq!(value["4242"]["policy"], "standard");
    }

    #[test]
    fn records_survive_a_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let registry = Registry::open(tmp.path()).unwrap();
            registry.insert(record(100, "Firefox (firefox)", 60));
            registry.insert(record(200, "Files (nautilus)", 0));
        }

        let reopened = Registry::open(tmp.path()).unwrap();
        let records = reopened.snapshot();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pid, 100);
        assert_eq!(records[0].name, "Firefox (firefox)");
        assert_eq!(records[1].pid, 200);
    }

    #[test]
    fn remove_hits_persist_and_misses_do_not_touch_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = Registry::open(tmp.path()).unwrap();

        assert!(registry.remove(999).is_none());
        assert!(!tmp.path().join(REGISTRY_FILE).exists());

        registry.insert(record(999, "Gedit", 0));
        let removed = registry.remove(999).unwrap();
        assert_eq!(removed.pid, 999);

        let reopened = Registry::open(tmp.path()).unwrap();
        assert!(reopened.snapshot().is_empty());
    }

    #[test]
    fn a_corrupt_file_loads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(REGISTRY_FILE), "{not valid json").unwrap();
        let registry = Registry::open(tmp.path()).unwrap();
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn apply_batches_mutations_into_one_persist() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = Registry::open(tmp.path()).unwrap();

        let count = registry.apply(|records| {
            records.insert(300, record(300, "Vlc", 30));
            records.insert(400, record(400, "Okular", 10));
            (true, records.len())
        });
        assert_eq!(count, 2);

        let reopened = Registry::open(tmp.path()).unwrap();
        assert_eq!(reopened.pids().len(), 2);
    }

    #[test]
    fn snapshot_orders_by_launch_time() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = Registry::open(tmp.path()).unwrap();
        registry.insert(record(7, "Newest", 1));
        registry.insert(record(9, "Oldest", 500));
        registry.insert(record(8, "Middle", 250));

        let names: Vec<_> = registry.snapshot().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["Oldest", "Middle", "Newest"]);
    }

    #[test]
    fn uptime_never_goes_negative() {
        let mut rec = record(1, "Clock", 0);
        rec.started_at = Utc::now() + Duration::seconds(3600);
        assert_eq!(rec.uptime_secs(), 0);
    }
}
