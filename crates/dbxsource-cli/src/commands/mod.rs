//! Subcommands of the `dbxsource` binary

pub mod config;
pub mod schema;
pub mod sync;

use std::path::PathBuf;

use dbxsource_core::config::Config;

use crate::output::OutputFormat;

/// State shared by every subcommand, built once in `main`
#[derive(Debug, Clone)]
pub struct AppContext {
    /// File the configuration was read from (it may not exist)
    pub config_path: PathBuf,
    pub config: Config,
    pub format: OutputFormat,
}
