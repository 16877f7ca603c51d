//! Sync command - Run one pass from Dropbox into the graph store
//!
//! Provides the `dbxsource sync` CLI command which:
//! 1. Applies command-line overrides and validates the configuration
//! 2. Opens the SQLite database (in memory for `--dry-run`)
//! 3. Wires the Dropbox, SQLite and filesystem adapters into the orchestrator
//! 4. Runs the pass (or only the listing for `--dry-run`) and prints the report

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use dbxsource_cache::{DatabasePool, SqliteCacheStore, SqliteGraphStore};
use dbxsource_core::config::Config;
use dbxsource_core::domain::SyncNode;
use dbxsource_dropbox::DropboxRemoteClient;
use dbxsource_sync::{ContentSyncEngine, FsBlobMaterializer, SyncOrchestrator, SyncReport};

use super::AppContext;
use crate::output::{get_formatter, OutputFormatter};

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Remote folder to sync (overrides source.path)
    #[arg(long)]
    pub path: Option<String>,

    /// Only list the top level of the folder
    #[arg(long)]
    pub no_recursive: bool,

    /// Emit folder nodes, the root node and typed file kinds
    #[arg(long)]
    pub folder_nodes: bool,

    /// Allowed extensions, comma separated (e.g. .md,.jpg)
    #[arg(long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// List and synthesize nodes without touching content or stores
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncCommand {
    /// Configuration with this command's overrides applied
    fn effective_config(&self, base: &Config) -> Config {
        let mut config = base.clone();
        if let Some(path) = &self.path {
            config.source.path = path.clone();
        }
        if self.no_recursive {
            config.source.recursive = false;
        }
        if self.folder_nodes {
            config.source.create_folder_nodes = true;
        }
        if let Some(extensions) = &self.extensions {
            config.source.extensions = extensions
                .iter()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect();
        }
        config
    }

    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let formatter = get_formatter(ctx.format);
        let config = self.effective_config(&ctx.config);

        let errors = config.validate();
        if !errors.is_empty() {
            for error in &errors {
                formatter.error(&error.to_string());
            }
            bail!("Invalid configuration ({} error(s))", errors.len());
        }

        let token = config
            .source
            .access_token()
            .context("Access token missing after validation")?;
        let remote = Arc::new(DropboxRemoteClient::with_token(token));

        let db = if self.dry_run {
            DatabasePool::in_memory().await
        } else {
            DatabasePool::new(&config.storage.database).await
        }
        .context("Failed to open database")?;

        let graph = Arc::new(SqliteGraphStore::new(db.pool().clone()));
        let cache = Arc::new(SqliteCacheStore::new(db.pool().clone()));
        let materializer = Arc::new(FsBlobMaterializer::new(&config.storage.content_dir));
        let engine = ContentSyncEngine::new(remote.clone(), graph.clone(), materializer, cache);
        let orchestrator = SyncOrchestrator::new(config.source.clone(), remote, graph, engine);

        info!(
            path = %config.source.path,
            dry_run = self.dry_run,
            database = %config.storage.database.display(),
            "Sync requested"
        );

        let result = if self.dry_run {
            self.print_plan(&orchestrator, formatter.as_ref(), ctx).await
        } else {
            let output = orchestrator.run_sync_pass().await;
            print_report(&output.report, formatter.as_ref(), ctx)
        };

        db.close().await;
        result
    }

    async fn print_plan(
        &self,
        orchestrator: &SyncOrchestrator,
        formatter: &dyn OutputFormatter,
        ctx: &AppContext,
    ) -> Result<()> {
        let nodes = match orchestrator.plan().await {
            Ok(nodes) => nodes,
            Err(err) => {
                formatter.warn(&format!("Listing failed: {err:#}"));
                Vec::new()
            }
        };

        if ctx.format.is_json() {
            formatter.print_json(&serde_json::json!({
                "dry_run": true,
                "nodes": nodes,
            }));
            return Ok(());
        }

        formatter.success(&format!("Dry run: {} node(s) would be published", nodes.len()));
        for node in &nodes {
            formatter.info(&describe_node(node));
        }
        Ok(())
    }
}

fn describe_node(node: &SyncNode) -> String {
    format!("{:<16} {}", node.type_name(), node.local_path())
}

fn print_report(report: &SyncReport, formatter: &dyn OutputFormatter, ctx: &AppContext) -> Result<()> {
    if ctx.format.is_json() {
        formatter.print_json(&serde_json::json!({
            "success": report.is_clean(),
            "report": serde_json::to_value(report).context("Failed to serialize report")?,
        }));
        return Ok(());
    }

    if report.listing_failed {
        formatter.warn("Listing failed; no nodes were published");
        return Ok(());
    }

    formatter.success(&format!(
        "Sync complete: {} node(s) published in {} ms",
        report.nodes_published, report.duration_ms
    ));
    formatter.info(&format!("File nodes: {}", report.file_nodes));
    formatter.info(&format!("Cache hits: {}", report.cache_hits));
    formatter.info(&format!("Downloads:  {}", report.downloads));
    formatter.info(&format!("Removed:    {}", report.nodes_removed));

    for failure in &report.failures {
        formatter.warn(&format!(
            "{} published without content ({}): {}",
            failure.node_id, failure.kind, failure.reason
        ));
    }
    for failure in &report.publish_failures {
        formatter.warn(&format!("{} not published: {}", failure.node_id, failure.reason));
    }
    for warning in &report.warnings {
        formatter.warn(&format!("{}: {}", warning.node_id, warning.reason));
    }
    if let Some(reason) = &report.sweep_error {
        formatter.warn(&format!("Stale nodes not removed: {reason}"));
    }
    Ok(())
}
