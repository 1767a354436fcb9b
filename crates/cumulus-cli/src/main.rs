//! Cumulus CLI - Command-line interface for cumulus
//!
//! Provides commands for:
//! - Pushing a local tree to the mirror store
//! - Pulling the mirror store into the local tree

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cumulus_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{pull::PullCommand, push::PushCommand};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "cumulus", version, about = "Directory synchronization with a confirmation gate")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Make the remote side match the local tree
    Push(PushCommand),
    /// Make the local tree match the remote side
    Pull(PullCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing; without -v the configured level applies.
    let filter = match cli.verbose {
        0 => {
            let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
            Config::load_or_default(&config_path).logging.level
        }
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Push(cmd) => cmd.execute(format, cli.config.as_deref()).await,
        Commands::Pull(cmd) => cmd.execute(format, cli.config.as_deref()).await,
    }
}
