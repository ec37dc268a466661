//! Sandbox lifecycle commands: ps, stop, log, watch, prune.

use std::path::PathBuf;

use anyhow::{Context, Result};
#[cfg(unix)]
use colored::Colorize;
#[cfg(unix)]
use firepit::SandboxRecord;

use crate::OutputFormat;

/// Arguments for `firepit ps`.
#[derive(clap::Args)]
pub struct PsArgs {
    /// Only display PIDs.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Output format.
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for `firepit stop`.
#[derive(clap::Args)]
pub struct StopArgs {
    /// Terminate every active sandbox.
    #[arg(short = 'a', long, conflicts_with = "pids")]
    pub all: bool,

    /// PIDs of the sandboxes to terminate.
    #[arg(required_unless_present = "all", num_args = 1..)]
    pub pids: Vec<u32>,
}

/// Arguments for `firepit log`.
#[derive(clap::Args)]
pub struct LogArgs {
    /// PID of the sandbox.
    pub pid: u32,
}

/// Arguments for `firepit watch`.
#[derive(clap::Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds.
    #[arg(short = 'n', long, default_value_t = 2)]
    pub interval: u64,
}

/// Resolves the data directory: `--data-dir`, then `$FIREPIT_DATA_DIR`,
/// then the platform data directory.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os("FIREPIT_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(dirs::data_dir()
        .context("no platform data directory")?
        .join("firepit"))
}

/// Opens the firepit runtime, optionally echoing progress lines to stderr.
#[cfg(unix)]
pub fn open_runtime(data_dir: Option<PathBuf>, progress: bool) -> Result<firepit::Runtime> {
    let dir = resolve_data_dir(data_dir)?;
    let callback = progress
        .then(|| Box::new(|line: &str| eprintln!("{line}")) as firepit::LogCallback);
    Ok(firepit::Runtime::with_callback(dir, callback)?)
}

#[cfg(unix)]
pub async fn ps(args: &PsArgs, data_dir: Option<PathBuf>) -> Result<()> {
    let rt = open_runtime(data_dir, false)?;
    let sandboxes = rt.active().await;

    if args.quiet {
        for sb in &sandboxes {
            println!("{}", sb.pid);
        }
        return Ok(());
    }

    if matches!(args.format, OutputFormat::Json) {
        println!("{}", serde_json::to_string_pretty(&sandboxes)?);
        return Ok(());
    }

    if sandboxes.is_empty() {
        return Ok(());
    }
    render_table(&sandboxes);
    Ok(())
}

#[cfg(unix)]
pub async fn stop(args: StopArgs, data_dir: Option<PathBuf>) -> Result<()> {
    let rt = open_runtime(data_dir, true)?;

    if args.all {
        let summary = rt.terminate_all().await;
        for pid in &summary.terminated {
            println!("{pid}");
        }
        eprintln!("Terminated {} sandboxes", summary.terminated.len());
        if summary.failed.is_empty() {
            return Ok(());
        }
        let errors: Vec<String> = summary
            .failed
            .iter()
            .map(|(pid, e)| format!("{pid}: {e}"))
            .collect();
        anyhow::bail!("{}", errors.join("\n"));
    }

    let mut errors = Vec::new();
    for pid in &args.pids {
        match rt.terminate(*pid).await {
            Ok(message) => println!("{message}"),
            Err(e) => errors.push(format!("{pid}: {e}")),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{}", errors.join("\n"))
    }
}

#[cfg(unix)]
pub async fn log(args: &LogArgs, data_dir: Option<PathBuf>) -> Result<()> {
    let rt = open_runtime(data_dir, false)?;
    // Pick up sandboxes started by other processes before the lookup.
    rt.reconcile().await;
    print!("{}", rt.session_log(args.pid)?);
    Ok(())
}

#[cfg(unix)]
pub async fn watch(args: &WatchArgs, data_dir: Option<PathBuf>) -> Result<()> {
    let rt = open_runtime(data_dir, false)?;
    let interval = std::time::Duration::from_secs(args.interval.max(1));

    loop {
        let sandboxes = rt.active().await;
        // ANSI clear screen, cursor home.
        print!("\x1b[2J\x1b[H");
        println!(
            "firepit watch ({}), Ctrl-C to exit",
            chrono::Local::now().format("%H:%M:%S")
        );
        println!();
        if sandboxes.is_empty() {
            println!("No active sandboxes.");
        } else {
            render_table(&sandboxes);
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    println!();
    Ok(())
}

#[cfg(unix)]
pub async fn prune(data_dir: Option<PathBuf>) -> Result<()> {
    let rt = open_runtime(data_dir, true)?;
    let summary = rt.prune_profiles().await;
    eprintln!(
        "Cleanup: Removed {} profiles, freed {}",
        summary.removed,
        crate::human_size(summary.bytes)
    );
    Ok(())
}

#[cfg(unix)]
fn render_table(sandboxes: &[SandboxRecord]) {
    println!(
        "{:<8} {:<28} {:<12} {:<10} TARGET",
        "PID", "NAME", "POLICY", "UPTIME"
    );
    for sb in sandboxes {
        // Pad before coloring: escape codes would throw off the column width.
        let policy = format!("{:<12}", sb.policy.map_or("-", firepit::Policy::name));
        let policy = match sb.policy {
            Some(firepit::Policy::Restrictive) => policy.red(),
            Some(firepit::Policy::Permissive) => policy.green(),
            Some(_) => policy.yellow(),
            None => policy.normal(),
        };
        println!(
            "{:<8} {:<28} {} {:<10} {}",
            sb.pid,
            truncate(&sb.name, 28),
            policy,
            fmt_uptime(sb.uptime_secs()),
            sb.target.as_deref().unwrap_or("-"),
        );
    }
}

/// Truncates to at most `max` characters, marking the cut with `...`.
#[cfg(unix)]
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_owned()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

/// Formats an uptime as `2h 3m`, `5m 12s`, or `42s`.
#[cfg(unix)]
fn fmt_uptime(secs: u64) -> String {
    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}

#[cfg(not(unix))]
macro_rules! unix_only_stub {
    ($($name:ident($($arg:ident: $ty:ty),*));+ $(;)?) => {
        $(
            pub async fn $name($(_: $ty),*) -> Result<()> {
                anyhow::bail!("Sandbox management requires Linux")
            }
        )+
    };
}

#[cfg(not(unix))]
unix_only_stub! {
    ps(args: &PsArgs, data_dir: Option<PathBuf>);
    stop(args: StopArgs, data_dir: Option<PathBuf>);
    log(args: &LogArgs, data_dir: Option<PathBuf>);
    watch(args: &WatchArgs, data_dir: Option<PathBuf>);
    prune(data_dir: Option<PathBuf>);
}
