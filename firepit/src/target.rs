//! Launch target normalization.
//!
//! Raw targets arrive as desktop drag-and-drop URLs, `~`-relative paths,
//! absolute paths, or bare command names. [`Target::resolve`] cleans them
//! up and classifies what kind of thing is being launched.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::error::{Error, Result};

/// A normalized, classified launch target.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Target {
    /// An existing directory, opened with the desktop file manager.
    Directory(PathBuf),
    /// An existing non-executable file, dispatched by type.
    File(PathBuf),
    /// An existing file with an execute bit set, run directly.
    Executable(PathBuf),
    /// A bare command name found on `$PATH`.
    Command(String),
}

impl Target {
    /// Normalizes `raw` and classifies it.
    ///
    /// Strips a `file://` prefix (percent-decoding the remainder), expands
    /// a leading `~`, absolutizes existing paths, and falls back to a
    /// `$PATH` lookup for bare names. Fails with [`Error::NotFound`] when
    /// nothing matches.
    pub fn resolve(raw: &str) -> Result<Self> {
        Self::resolve_with_home(raw, dirs::home_dir)
    }

    /// [`Self::resolve`] with an injectable home directory lookup.
    fn resolve_with_home<H>(raw: &str, home: H) -> Result<Self>
    where
        H: FnOnce() -> Option<PathBuf>,
    {
        let cleaned = normalize(raw, home);
        let path = Path::new(&cleaned);

        if path.exists() {
            let abs = std::path::absolute(path)?;
            return Ok(Self::classify(abs));
        }

        if !cleaned.contains('/') && search_path(&cleaned).is_some() {
            return Ok(Self::Command(cleaned));
        }

        Err(Error::NotFound(cleaned))
    }

    /// Classifies an existing absolute path.
    fn classify(path: PathBuf) -> Self {
        if path.is_dir() {
            Self::Directory(path)
        } else if path.is_file() && is_executable(&path) {
            Self::Executable(path)
        } else {
            Self::File(path)
        }
    }

    /// Final component of the target, for classification.
    pub(crate) fn basename(&self) -> String {
        match self {
            Self::Directory(p) | Self::File(p) | Self::Executable(p) => p
                .file_name()
                .map_or_else(|| p.display().to_string(), |n| n.to_string_lossy().into_owned()),
            Self::Command(name) => name.rsplit('/').next().unwrap_or(name).to_owned(),
        }
    }

    /// Working directory for the spawned sandbox: the directory itself, a
    /// file's parent, or the user's home for bare commands.
    #[must_use]
    pub fn work_dir(&self) -> PathBuf {
        match self {
            Self::Directory(p) => p.clone(),
            Self::File(p) | Self::Executable(p) => {
                p.parent().map_or_else(|| PathBuf::from("/"), Path::to_path_buf)
            }
            Self::Command(_) => dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")),
        }
    }
}

impl std::fmt::Display for Target {
    /// The normalized target string, as recorded in the registry.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory(p) | Self::File(p) | Self::Executable(p) => p.display().fmt(f),
            Self::Command(name) => f.write_str(name),
        }
    }
}

/// Trims, strips a `file://` prefix with percent-decoding, and expands `~`.
fn normalize<H>(raw: &str, home: H) -> String
where
    H: FnOnce() -> Option<PathBuf>,
{
    let trimmed = raw.trim();
    let decoded = match trimmed.strip_prefix("file://") {
        Some(rest) => percent_decode_str(rest).decode_utf8_lossy().into_owned(),
        None => trimmed.to_owned(),
    };
    // tilde_with_context takes string homes, not paths.
    shellexpand::tilde_with_context(&decoded, || {
        home().map(|p| p.to_string_lossy().into_owned())
    })
    .into_owned()
}

/// Searches `$PATH` for an executable named `name`.
fn search_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var("PATH").ok()?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|p| p.is_file() && is_executable(p))
}

/// True when the path has any execute bit set.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).is_ok_and(|m| m.permissions().mode() & 0o111 != 0)
}

/// Execute bits are not meaningful off unix; treat everything as data.
#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}
