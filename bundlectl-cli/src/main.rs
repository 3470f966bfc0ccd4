//! bundlectl - browse and search cached rules and plugin indexes
//!
//! Main entry point: argument parsing, logging setup and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use bundlectl_core::catalog::Paths;

mod artifact_cli;
mod index_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "bundlectl",
    about = "Manage artifact indexes and search the rules and plugins they describe",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Configuration directory (defaults to the platform config directory)
    #[clap(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Log level written to stderr
    #[clap(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interact with indexes
    Index(index_cli::IndexCommand),

    /// Interact with the artifacts described by the configured indexes
    Artifact(artifact_cli::ArtifactCommand),
}

/// Initialize tracing from the --log-level flag
fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::new(log_level.to_filter_directive());

    // Logs go to stderr so tables and JSON on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level);

    let paths = Paths::discover(cli.config_dir)?;
    tracing::debug!(root = %paths.root().display(), "Using configuration directory");

    match cli.command {
        Command::Index(command) => command.execute(&paths),
        Command::Artifact(command) => command.execute(&paths),
    }
}
