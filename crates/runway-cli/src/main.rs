//! Runway - on-demand runtime acquisition
//!
//! Usage:
//!   runway acquire 8.0.1           # Install (or reuse) a runtime
//!   runway acquire 8.0.100 --sdk   # Install an SDK
//!   runway status 8.0.1            # Report where a version is installed
//!   runway uninstall-all           # Remove every acquired version
//!   runway paths                   # Show configured locations

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use runway_core::commands::{
    AcquireCommand, AcquireOptions, AcquireReport, PathSource, StatusCommand, StatusOptions,
    UninstallAllCommand,
};
use runway_core::context::AppContext;
use runway_core::types::AcquisitionKind;

#[derive(Parser)]
#[command(name = "runway")]
#[command(about = "On-demand runtime acquisition", long_about = None)]
struct Cli {
    /// Config file (defaults to $RUNWAY_CONFIG, then the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a version, or return the existing install
    Acquire {
        /// Exact version to acquire
        version: String,

        /// Acquire the full SDK instead of the runtime
        #[arg(long)]
        sdk: bool,

        /// Identifier of the requesting tool, matched against pinned installs
        #[arg(long)]
        requester: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show whether a version is installed
    Status {
        version: String,

        #[arg(long)]
        sdk: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove every acquired version and reset install state
    UninstallAll {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the config file, storage root and state file locations
    Paths {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable output
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// No output; the exit code carries the result
    Quiet,
}

fn kind(sdk: bool) -> AcquisitionKind {
    if sdk {
        AcquisitionKind::Sdk
    } else {
        AcquisitionKind::Runtime
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runway=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::load(cli.config.as_deref())?;
    tracing::debug!(config = %ctx.config_path().display(), "loaded configuration");

    let code = match cli.command {
        Commands::Acquire {
            version,
            sdk,
            requester,
            format,
        } => run_acquire(&ctx, version, kind(sdk), requester, format).await?,
        Commands::Status {
            version,
            sdk,
            format,
        } => run_status(&ctx, version, kind(sdk), format).await?,
        Commands::UninstallAll { format } => run_uninstall_all(&ctx, format).await?,
        Commands::Paths { format } => run_paths(&ctx, format)?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

async fn run_acquire(
    ctx: &AppContext,
    version: String,
    kind: AcquisitionKind,
    requester: Option<String>,
    format: OutputFormat,
) -> Result<i32> {
    let mut options = match kind {
        AcquisitionKind::Runtime => AcquireOptions::runtime(version),
        AcquisitionKind::Sdk => AcquireOptions::sdk(version),
    };
    if let Some(requester) = requester {
        options = options.with_requester(requester);
    }

    let report = AcquireCommand::from_context(ctx).execute(&options).await?;
    print_acquire_result(&report, format)?;
    Ok(0)
}

fn print_acquire_result(report: &AcquireReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let note = match report.source {
                PathSource::Existing => " (pinned)",
                PathSource::Acquired => "",
            };
            println!(
                "{} {} {}{}",
                style("✓").green(),
                report.kind,
                style(&report.version).bold(),
                note
            );
            println!("  {}", report.path.display());
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "version": report.version,
                "kind": report.kind,
                "path": report.path,
                "source": report.source,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

async fn run_status(
    ctx: &AppContext,
    version: String,
    kind: AcquisitionKind,
    format: OutputFormat,
) -> Result<i32> {
    let report = StatusCommand::from_context(ctx)
        .execute(&StatusOptions::new(version, kind))
        .await;

    match format {
        OutputFormat::Table => match &report.path {
            Some(path) => {
                println!(
                    "{} {} {} is installed",
                    style("✓").green(),
                    report.kind,
                    style(&report.version).bold()
                );
                println!("  {}", path.display());
            }
            None => println!(
                "{} {} {} is not installed",
                style("•").yellow(),
                report.kind,
                style(&report.version).bold()
            ),
        },
        OutputFormat::Json => {
            let output = serde_json::json!({
                "version": report.version,
                "kind": report.kind,
                "installed": report.installed,
                "path": report.path,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Quiet => {}
    }

    Ok(if report.installed { 0 } else { 1 })
}

async fn run_uninstall_all(ctx: &AppContext, format: OutputFormat) -> Result<i32> {
    let report = UninstallAllCommand::from_context(ctx).execute().await?;

    match format {
        OutputFormat::Table => {
            if report.removed {
                println!(
                    "{} Removed {}",
                    style("✓").green(),
                    report.storage_root.display()
                );
            } else {
                println!("• Nothing installed under {}", report.storage_root.display());
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "storage_root": report.storage_root,
                "removed": report.removed,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Quiet => {}
    }
    Ok(0)
}

fn run_paths(ctx: &AppContext, format: OutputFormat) -> Result<i32> {
    let state_file = ctx.state_file()?;

    match format {
        OutputFormat::Table => {
            println!("Config:       {}", ctx.config_path().display());
            println!("Storage root: {}", ctx.storage_root().display());
            println!("State file:   {}", state_file.display());
            if let Some(log) = &ctx.config().event_log {
                println!("Event log:    {}", log.display());
            }
            match &ctx.config().installer.command {
                Some(command) => println!("Installer:    {}", command.display()),
                None => println!("Installer:    {}", style("not configured").yellow()),
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "config": ctx.config_path(),
                "storage_root": ctx.storage_root(),
                "state_file": state_file,
                "event_log": ctx.config().event_log,
                "installer": ctx.config().installer.command,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Quiet => {}
    }
    Ok(0)
}
