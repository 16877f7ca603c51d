//! Config command - View and validate dbxsource configuration
//!
//! Provides the `dbxsource config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON, token redacted)
//! 2. Validates it and reports every error
//! 3. Prints the configuration file path

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use dbxsource_core::config::Config;

use super::AppContext;
use crate::output::get_formatter;

const REDACTED: &str = "********";

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the configuration
    Validate,
    /// Print the configuration file path
    Path,
}

impl ConfigCommand {
    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        match self {
            ConfigCommand::Show => execute_show(ctx),
            ConfigCommand::Validate => execute_validate(ctx),
            ConfigCommand::Path => execute_path(ctx),
        }
    }
}

/// Copy of `config` that is safe to print
fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    if shown.source.access_token.is_some() {
        shown.source.access_token = Some(REDACTED.to_string());
    }
    shown
}

fn execute_show(ctx: &AppContext) -> Result<()> {
    let formatter = get_formatter(ctx.format);
    let shown = redacted(&ctx.config);

    info!(config_path = %ctx.config_path.display(), "Showing configuration");

    if ctx.format.is_json() {
        let json =
            serde_json::to_value(&shown).context("Failed to serialize configuration to JSON")?;
        formatter.print_json(&json);
        return Ok(());
    }

    let source = if ctx.config_path.exists() {
        ctx.config_path.display().to_string()
    } else {
        format!("defaults, {} not found", ctx.config_path.display())
    };
    formatter.success(&format!("Configuration ({source})"));
    formatter.info("");
    let yaml = serde_yaml::to_string(&shown).context("Failed to serialize configuration to YAML")?;
    for line in yaml.lines() {
        formatter.info(line);
    }
    Ok(())
}

fn execute_validate(ctx: &AppContext) -> Result<()> {
    let formatter = get_formatter(ctx.format);
    let errors = ctx.config.validate();

    if ctx.format.is_json() {
        let messages: Vec<serde_json::Value> = errors
            .iter()
            .map(|e| serde_json::json!({"field": e.field, "message": e.message}))
            .collect();
        formatter.print_json(&serde_json::json!({
            "valid": errors.is_empty(),
            "config_path": ctx.config_path.display().to_string(),
            "errors": messages,
        }));
        return Ok(());
    }

    if errors.is_empty() {
        formatter.success(&format!(
            "Configuration is valid ({})",
            ctx.config_path.display()
        ));
    } else {
        formatter.error(&format!("{} validation error(s):", errors.len()));
        for error in &errors {
            formatter.info(&error.to_string());
        }
    }
    Ok(())
}

fn execute_path(ctx: &AppContext) -> Result<()> {
    let formatter = get_formatter(ctx.format);
    if ctx.format.is_json() {
        formatter.print_json(&serde_json::json!({
            "config_path": ctx.config_path.display().to_string(),
            "exists": ctx.config_path.exists(),
        }));
    } else {
        println!("{}", ctx.config_path.display());
    }
    Ok(())
}
