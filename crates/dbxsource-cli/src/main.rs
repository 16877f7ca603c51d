//! dbxsource CLI - Command-line interface for dbxsource
//!
//! Provides commands for:
//! - Running a sync pass from Dropbox into the local graph store
//! - Inspecting and validating configuration
//! - Printing the schema types contributed by folder nodes

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{config::ConfigCommand, schema::SchemaCommand, sync::SyncCommand, AppContext};
use dbxsource_core::config::{Config, LoggingConfig};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "dbxsource",
    version,
    about = "Incremental Dropbox source for static-site graph data"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
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
    /// Run one sync pass
    Sync(SyncCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the schema types contributed by folder nodes
    Schema(SchemaCommand),
}

/// Reads the configuration file if present, then applies environment overrides
fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        Config::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?
    } else {
        Config::default()
    };
    Ok(config.with_env_overrides())
}

/// `RUST_LOG` wins; otherwise `-v` raises the configured level
fn log_directive(verbose: u8, logging: &LoggingConfig) -> String {
    match verbose {
        0 => logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn init_tracing(verbose: u8, logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(verbose, logging)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = load_config(&config_path)?;

    init_tracing(cli.verbose, &config.logging);

    let ctx = AppContext {
        config_path,
        config,
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        },
    };

    match cli.command {
        Commands::Sync(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
        Commands::Schema(cmd) => cmd.execute(&ctx).await,
    }
}
