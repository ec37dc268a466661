//! Throwaway Firefox profiles.
//!
//! Browser launches would otherwise attach to an already-running instance
//! outside the sandbox, so each one gets a fresh profile registered in
//! `profiles.ini` and torn down once no sandbox references it.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

/// Directory-name prefix for profiles this crate owns.
pub(crate) const PROFILE_PREFIX: &str = "firepit-";

/// Manages per-launch browser profiles under one profiles directory.
#[derive(Debug, Clone)]
pub(crate) struct ProfileCatalog {
    root: PathBuf,
}

impl ProfileCatalog {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The stock Firefox profiles directory for the current user.
    pub(crate) fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".mozilla").join("firefox"))
    }

    /// Creates an empty profile named after `instance` and registers it in
    /// `profiles.ini`. A leftover directory from a recycled id is replaced.
    ///
    /// The ini append is best-effort; the profile directory is usable either
    /// way because firejail launches firefox with `-P <name>`.
    pub(crate) fn allocate(&self, instance: &str) -> io::Result<String> {
        fs::create_dir_all(&self.root)?;

        let name = format!("{PROFILE_PREFIX}{instance}");
        let dir = self.root.join(&name);
        if dir.exists() {
            let _ = fs::remove_dir_all(&dir);
        }
        fs::create_dir_all(&dir)?;

        let section = format!("\n[Profile{instance}]\nName={name}\nIsRelative=1\nPath={name}\n");
        if let Err(err) = append_ini(&self.root.join("profiles.ini"), &section) {
            warn!("Could not update profiles.ini: {}", err);
        }

        Ok(name)
    }

    /// Removes profile directories no live sandbox references, returning how
    /// many were deleted and the bytes reclaimed.
    ///
    /// Liveness is judged by name: a profile passed via `-P <name>` shows up
    /// verbatim in its sandbox's command line.
    pub(crate) fn prune(&self, live_cmdlines: &[String]) -> (usize, u64) {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return (0, 0);
        };

        let mut removed = 0;
        let mut bytes = 0;
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            if !name.starts_with(PROFILE_PREFIX) || !path.is_dir() {
                continue;
            }
            if live_cmdlines.iter().any(|cmdline| cmdline.contains(&name)) {
                continue;
            }

            let size = dir_size(&path);
            match fs::remove_dir_all(&path) {
                Ok(()) => {
                    removed += 1;
                    bytes += size;
                    info!("Cleaned up stale profile: {}", name);
                }
                Err(err) => warn!("Failed to clean {}: {}", name, err),
            }
        }
        (removed, bytes)
    }
}

fn append_ini(path: &Path, section: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    file.write_all(section.as_bytes())
}

fn dir_size(path: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(path) else {
        return 0;
    };
    let mut total = 0;
    for entry in entries.flatten() {
        let Ok(meta) = entry.metadata() else { continue };
        if meta.is_dir() {
            total += dir_size(&entry.path());
        } else {
            total += meta.len();
        }
    }
    total
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn allocate_creates_directory_and_ini_section() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = ProfileCatalog::new(tmp.path().to_path_buf());

        let name = catalog.allocate("abc123def456").unwrap();
        assert_eq!(name, "firepit-abc123def456");
        assert!(tmp.path().join(&name).is_dir());

        let ini = fs::read_to_string(tmp.path().join("profiles.ini")).unwrap();
        assert!(ini.contains("[Profileabc123def456]"));
        assert!(ini.contains("Name=firepit-abc123def456"));
        assert!(ini.contains("IsRelative=1"));
        assert!(ini.contains("Path=firepit-abc123def456"));
    }

    #[test]
    fn allocate_replaces_a_leftover_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = ProfileCatalog::new(tmp.path().to_path_buf());

        let name = catalog.allocate("aa11bb22cc33").unwrap();
        let stale = tmp.path().join(&name).join("places.sqlite");
        fs::write(&stale, b"old").unwrap();

        catalog.allocate("aa11bb22cc33").unwrap();
        assert!(tmp.path().join(&name).is_dir());
        assert!(!stale.exists());
    }

    #[test]
    fn prune_removes_stale_and_keeps_referenced_profiles() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = ProfileCatalog::new(tmp.path().to_path_buf());

        for instance in ["stale0001", "live0002"] {
            let name = catalog.allocate(instance).unwrap();
            fs::write(tmp.path().join(&name).join("prefs.js"), b"x".repeat(64)).unwrap();
        }
        fs::create_dir(tmp.path().join("default-release")).unwrap();

        let live = vec!["firejail firefox -P firepit-live0002 --new-instance".to_owned()];
        let (removed, bytes) = catalog.prune(&live);

        assert_eq!(removed, 1);
        assert!(bytes >= 64);
        assert!(!tmp.path().join("firepit-stale0001").exists());
        assert!(tmp.path().join("firepit-live0002").is_dir());
        assert!(tmp.path().join("default-release").is_dir());
    }

    #[test]
    fn prune_on_a_missing_root_is_a_no_op() {
        let catalog = ProfileCatalog::new(PathBuf::from("/nonexistent/firepit-test-root"));
        assert_eq!(catalog.prune(&[]), (0, 0));
    }
}
