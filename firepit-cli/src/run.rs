//! `firepit run`: launch a target inside a new firejail sandbox.

use std::path::PathBuf;

use anyhow::Result;
use firepit::Policy;

/// Arguments for `firepit run`.
///
/// Usage: `firepit run [OPTIONS] TARGET`
#[derive(clap::Args)]
pub struct RunArgs {
    /// File, directory, executable path, command name, or file:// URL.
    #[arg(required = true)]
    target: String,

    /// Security policy: restrictive, standard, or permissive.
    #[arg(short = 'p', long, default_value_t = Policy::Standard)]
    policy: Policy,

    /// Suppress progress output.
    #[arg(short = 'q', long)]
    quiet: bool,
}

impl RunArgs {
    /// Launches the target and prints the sandbox PID.
    ///
    /// Progress lines go to stderr; stdout carries only the PID so the
    /// output stays script-friendly.
    #[cfg(unix)]
    pub async fn run(self, data_dir: Option<PathBuf>) -> Result<()> {
        let rt = crate::sandbox::open_runtime(data_dir, !self.quiet)?;
        let launch = rt.launch(&self.target, self.policy).await?;
        println!("{}", launch.pid);
        Ok(())
    }

    #[cfg(not(unix))]
    #[allow(clippy::unused_async)]
    pub async fn run(self, _data_dir: Option<PathBuf>) -> Result<()> {
        anyhow::bail!("Sandbox launching requires Linux")
    }
}
