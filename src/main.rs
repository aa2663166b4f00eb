//! BPLIM utilities CLI
//!
//! Runs Lua scripts in one shared namespace, optionally teeing everything they
//! print into a log file.
//!
//! ## Usage
//!
//! ```bash
//! # Run scripts in order; globals set by one are visible to the next
//! bplim run load.lua clean.lua report.lua
//!
//! # Same, with console output mirrored into run.log (timestamps in the file)
//! bplim run --log run.log load.lua clean.lua
//!
//! # Append to an existing log instead of overwriting it
//! bplim run --log run.log --append report.lua
//!
//! # Log file from the environment
//! BPLIM_LOG_FILE=run.log BPLIM_LOG_APPEND=1 bplim run report.lua
//!
//! # Print a status banner
//! bplim banner opened run.log
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use bplim_core::logging::init_tracing;
use bplim_core::{
    errln, status_message, LoggerConfig, LoggerRegistry, RedirectingLogger, StatusAction,
    StdStreams,
};
use bplim_scripts::{ScriptExecutor, ScriptNamespace};
use clap::{Parser, Subcommand};

/// BPLIM utilities - logged script runs
#[derive(Parser)]
#[command(name = "bplim")]
#[command(version)]
#[command(about = "Run Lua scripts in a shared namespace with their output tee'd to a log file")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run script files in order against one namespace
    Run {
        /// Script files
        #[arg(required = true)]
        scripts: Vec<PathBuf>,

        /// Tee output into this log file (default: $BPLIM_LOG_FILE)
        #[arg(short, long)]
        log: Option<PathBuf>,

        /// Append to the log file instead of overwriting it
        #[arg(short, long)]
        append: bool,
    },

    /// Print the status banner for an action (opened, resumed, paused, closed)
    Banner {
        action: StatusAction,
        path: PathBuf,
    },
}

/// Log configuration from flags, falling back to the environment.
///
/// `$BPLIM_LOG_APPEND` only applies to a path taken from `$BPLIM_LOG_FILE`.
fn resolve_log_config(log: Option<PathBuf>, append: bool) -> Option<LoggerConfig> {
    match log {
        Some(path) => Some(LoggerConfig::new(path).with_append(append)),
        None => LoggerConfig::from_env().map(|config| {
            let env_append = config.append;
            config.with_append(append || env_append)
        }),
    }
}

fn run_scripts(
    streams: &Arc<StdStreams>,
    scripts: &[PathBuf],
    log: Option<LoggerConfig>,
) -> Result<ExitCode> {
    let namespace =
        ScriptNamespace::new(streams.clone()).context("Failed to create script namespace")?;

    let mut logger = match log {
        Some(config) => {
            let mut logger =
                RedirectingLogger::from_config(&config, LoggerRegistry::global(), streams.clone())?;
            logger
                .initialize()
                .with_context(|| format!("Failed to open log file {:?}", config.path))?;
            Some(logger)
        }
        None => None,
    };

    tracing::info!(count = scripts.len(), "Running scripts");
    let outcome = ScriptExecutor::new().execute_all(scripts, &namespace);

    // Report while the logger is still on so the failure lands in the file
    if let Err(e) = &outcome {
        errln!(streams, "{}", e)?;
    }

    if let Some(logger) = logger.as_mut() {
        logger.close()?;
    }
    streams.flush()?;

    match outcome {
        Ok(()) => {
            tracing::info!("All scripts completed");
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let streams = Arc::new(StdStreams::console());

    match cli.command {
        Commands::Run {
            scripts,
            log,
            append,
        } => run_scripts(&streams, &scripts, resolve_log_config(log, append)),
        Commands::Banner { action, path } => {
            let path = std::path::absolute(&path)?;
            streams.print(&status_message(action, &path, chrono::Local::now()))?;
            streams.flush()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
