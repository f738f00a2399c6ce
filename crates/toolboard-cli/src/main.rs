//! Toolboard - reconcile tool-call snapshots and render them in the terminal.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toolboard_cli::{commands, config, logging, render::OutputFormat};
use toolboard_types::ToolStatus;

use config::Config;
use logging::{LogConfig, LogFormat};

/// Toolboard - tool-call reconciliation and presentation.
#[derive(Parser, Debug)]
#[command(name = "toolboard")]
#[command(about = "Reconcile tool-call feeds into a single ranked, grouped view")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (INFO level for toolboard targets)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging (per-pass summaries)
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable trace logging (per-record decisions)
    #[arg(long, global = true)]
    trace: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "reconcile=debug").
    /// Can be specified multiple times. Targets are prefixed with "toolboard::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL", global = true)]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a snapshot once
    Render {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Output format (defaults to the configured format)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Re-render a snapshot whenever it changes
    Watch {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Output format (defaults to the configured format)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Show the exact line diff of one file-operation call
    Diff {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Call id of the file operation
        call_id: String,
        /// Print a unified diff instead of hunks
        #[arg(long)]
        unified: bool,
        /// Context lines around each change
        #[arg(long, default_value_t = 3)]
        context: usize,
        /// Output format for hunks (defaults to the configured format)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Describe a single tool call
    Describe {
        /// Tool name
        tool: String,
        /// Call status
        #[arg(long, default_value = "running")]
        status: ToolStatus,
        /// Arguments as a JSON object
        #[arg(long, value_name = "JSON")]
        args: Option<String>,
        /// Argument JSON that is still streaming (may be truncated)
        #[arg(long, value_name = "TEXT")]
        partial: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_cli(
        cli.verbose,
        cli.debug,
        cli.trace,
        cli.quiet,
        cli.log_overrides,
        cli.log_format,
    );
    logging::init(&log_config);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!(target: "toolboard::startup", "Loaded configuration: {:?}", config);

    match cli.command {
        Command::Render { snapshot, format } => {
            let format = format.unwrap_or(config.format);
            let output = commands::render_snapshot(&snapshot, format, &config, toolboard_core::now_ms())?;
            println!("{}", output);
        }
        Command::Watch { snapshot, format } => {
            let format = format.unwrap_or(config.format);
            commands::watch_snapshot(&snapshot, format, &config).await?;
        }
        Command::Diff {
            snapshot,
            call_id,
            unified,
            context,
            format,
        } => {
            let format = format.unwrap_or(config.format);
            let output = commands::diff_call(
                &snapshot,
                &call_id,
                unified,
                context,
                format,
                toolboard_core::now_ms(),
            )?;
            println!("{}", output);
        }
        Command::Describe {
            tool,
            status,
            args,
            partial,
        } => {
            let text = commands::describe_tool(&tool, status, args.as_deref(), partial.as_deref(), &config)?;
            println!("{}", text);
        }
    }

    Ok(())
}
