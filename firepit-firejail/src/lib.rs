//! Locates the host [firejail] binary for firepit.
//!
//! Firejail is a setuid-root sandbox and must come from the host
//! package manager; this crate only discovers it and exposes a [`path()`]
//! function with a cached result.
//!
//! # Platform
//!
//! Linux only. On other platforms, [`path()`] returns `None`.
//!
//! [firejail]: https://github.com/netblue30/firejail

use std::path::Path;
#[cfg(target_os = "linux")]
use std::path::PathBuf;
#[cfg(target_os = "linux")]
use std::sync::OnceLock;

/// Well-known install locations checked after `$PATH`.
#[cfg(target_os = "linux")]
const KNOWN_LOCATIONS: &[&str] = &["/usr/bin/firejail", "/usr/local/bin/firejail"];

/// Returns the path to the host `firejail` binary, or `None` if unavailable.
///
/// Search order:
/// 1. Sibling of the current executable.
/// 2. `$PATH` lookup.
/// 3. Well-known package-manager install locations.
#[cfg(target_os = "linux")]
pub fn path() -> Option<&'static Path> {
    static CACHED: OnceLock<Option<PathBuf>> = OnceLock::new();
    CACHED
        .get_or_init(|| {
            // 1. Sibling of the current executable.
            if let Some(p) = sibling_path("firejail") {
                return Some(p);
            }

            // 2. Search $PATH.
            if let Some(p) = search_path("firejail") {
                return Some(p);
            }

            // 3. Standard install locations.
            KNOWN_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.is_file())
        })
        .as_deref()
}

/// On non-Linux platforms, firejail is unavailable.
#[cfg(not(target_os = "linux"))]
pub fn path() -> Option<&'static Path> {
    None
}

/// Check for a binary next to the current executable.
#[cfg(target_os = "linux")]
fn sibling_path(name: &str) -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let sibling = exe.with_file_name(name);
    sibling.is_file().then_some(sibling)
}

/// Search `$PATH` for a binary.
#[cfg(target_os = "linux")]
fn search_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var("PATH").ok()?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|p| p.is_file())
}
