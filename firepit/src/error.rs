//! Error types for firepit operations.

/// Result type for firepit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while launching or managing sandboxes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The launch target exists neither as a path nor as a command on `$PATH`.
    #[error("path not found: {0}")]
    NotFound(String),

    /// No sandbox with the given PID is tracked or running.
    #[error("no sandbox with PID {0}")]
    UnknownPid(u32),

    /// The firejail binary could not be located on this host.
    #[error("firejail is not installed")]
    ToolMissing,

    /// The sandboxed process could not be spawned.
    #[error("failed to launch process")]
    Spawn(#[source] std::io::Error),

    /// Filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
