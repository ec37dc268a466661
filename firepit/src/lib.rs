//! Firejail-backed launcher for sandboxed desktop applications.
//!
//! `firepit` opens applications, documents, and directories inside
//! [`firejail`] sandboxes under one of three security policies, tracks the
//! resulting processes in a registry shared across firepit instances, and
//! records a per-session event log for each sandbox.
//!
//! # Quick start
//!
//! ```no_run
//! use firepit::{Policy, Runtime};
//!
//! # async fn demo() -> firepit::Result<()> {
//! let runtime = Runtime::open("/home/user/.local/share/firepit")?;
//! let launch = runtime.launch("~/Documents/report.pdf", Policy::Restrictive).await?;
//! println!("{}", launch.message);
//! # Ok(())
//! # }
//! ```
//!
//! [`firejail`]: https://firejail.wordpress.com

#[cfg(unix)]
mod classify;
#[cfg(unix)]
mod command;
mod error;
#[cfg(unix)]
mod firejail;
mod policy;
#[cfg(unix)]
mod profile;
mod registry;
#[cfg(unix)]
mod runtime;
#[cfg(unix)]
mod session;
mod target;

pub use error::{Error, Result};
#[cfg(unix)]
pub use firejail::{tool_path, tool_version};
pub use policy::{CapDrop, Policy, PolicyInfo};
pub use registry::{Registry, SandboxRecord};
#[cfg(unix)]
pub use runtime::{
    Launch, LogCallback, PruneSummary, ReconcileSummary, Runtime, TerminateSummary,
};
pub use target::Target;
