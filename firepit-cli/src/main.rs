//! CLI for the firepit sandboxed application launcher.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

mod run;
mod sandbox;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use firepit::Policy;

#[derive(Parser)]
#[command(
    name = "firepit",
    version,
    about = "Launch desktop applications in firejail sandboxes"
)]
struct Cli {
    /// Data directory (default: $FIREPIT_DATA_DIR or the platform data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Tracing filter used when RUST_LOG is unset (e.g. "firepit=debug").
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Launch a file, directory, or application in a sandbox.
    Run(run::RunArgs),

    /// List active sandboxes.
    #[command(visible_alias = "ls")]
    Ps(sandbox::PsArgs),

    /// Terminate one or more sandboxes.
    Stop(sandbox::StopArgs),

    /// Print the session event log of a sandbox.
    Log(sandbox::LogArgs),

    /// Live table of active sandboxes, refreshed until Ctrl-C.
    Watch(sandbox::WatchArgs),

    /// Describe the available security policies.
    Policies {
        /// Output format.
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove browser profiles left behind by dead sandboxes.
    Prune,

    /// Display firejail availability and runtime paths.
    Info {
        /// Output format.
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },

    /// Generate shell completion scripts.
    #[command(hide = true)]
    Completion {
        /// Target shell.
        shell: Shell,
    },
}

/// Output format for list/info commands.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable table.
    #[default]
    Table,
    /// Machine-readable JSON.
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());
    if let Err(e) = cli.dispatch().await {
        eprintln!("firepit: {e:#}");
        std::process::exit(1);
    }
}

impl Cli {
    async fn dispatch(self) -> Result<()> {
        let data_dir = self.data_dir;
        match self.command {
            Command::Run(args) => args.run(data_dir).await,
            Command::Ps(args) => sandbox::ps(&args, data_dir).await,
            Command::Stop(args) => sandbox::stop(args, data_dir).await,
            Command::Log(args) => sandbox::log(&args, data_dir).await,
            Command::Watch(args) => sandbox::watch(&args, data_dir).await,
            Command::Policies { format } => policies(format),
            Command::Prune => sandbox::prune(data_dir).await,
            Command::Info { format } => info(format, data_dir).await,
            Command::Completion { shell } => {
                clap_complete::generate(
                    shell,
                    &mut Self::command(),
                    "firepit",
                    &mut std::io::stdout(),
                );
                Ok(())
            }
        }
    }
}

fn policies(format: OutputFormat) -> Result<()> {
    if matches!(format, OutputFormat::Json) {
        let list: Vec<_> = Policy::ALL
            .iter()
            .map(|p| {
                let info = p.info();
                serde_json::json!({
                    "policy": p.name(),
                    "network": info.network,
                    "devices": info.devices,
                    "caps": caps_label(info.caps),
                    "description": info.description,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!(
        "{:<13} {:<9} {:<9} {:<16} DESCRIPTION",
        "POLICY", "NETWORK", "DEVICES", "CAPS"
    );
    for policy in Policy::ALL {
        let info = policy.info();
        // Pad before coloring: escape codes would throw off the column width.
        let name = format!("{:<13}", policy.name());
        let name = match policy {
            Policy::Restrictive => name.red(),
            Policy::Permissive => name.green(),
            _ => name.yellow(),
        };
        println!(
            "{} {:<9} {:<9} {:<16} {}",
            name,
            if info.network { "allowed" } else { "blocked" },
            if info.devices { "exposed" } else { "none" },
            caps_label(info.caps),
            info.description
        );
    }
    Ok(())
}

const fn caps_label(caps: firepit::CapDrop) -> &'static str {
    match caps {
        firepit::CapDrop::All => "drop all",
        firepit::CapDrop::Dangerous => "drop dangerous",
        firepit::CapDrop::Minimal => "minimal",
        _ => "unknown",
    }
}

#[cfg(unix)]
async fn info(format: OutputFormat, data_dir: Option<PathBuf>) -> Result<()> {
    let dir = sandbox::resolve_data_dir(data_dir)?;
    let tool = firepit::tool_path();
    let version = firepit::tool_version().await;
    let rt = firepit::Runtime::open(&dir)?;
    let active = rt.active().await.len();

    if matches!(format, OutputFormat::Json) {
        let obj = serde_json::json!({
            "firejail": tool.as_ref().map(|p| p.display().to_string()),
            "version": version,
            "data_dir": dir.display().to_string(),
            "active": active,
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    match (&tool, &version) {
        (Some(path), Some(v)) => println!("firejail:  {} ({v})", path.display()),
        (Some(path), None) => println!("firejail:  {}", path.display()),
        (None, _) => println!("firejail:  {}", "not installed".red()),
    }
    println!("data dir:  {}", dir.display());
    println!("active:    {active}");
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn info(_format: OutputFormat, _data_dir: Option<PathBuf>) -> Result<()> {
    anyhow::bail!("Sandbox management requires Linux")
}

fn init_tracing(level: Option<&str>) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Formats bytes into a human-readable size string.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}
