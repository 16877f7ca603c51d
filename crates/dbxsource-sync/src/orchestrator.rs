//! Sync pass orchestration
//!
//! ## Pass Flow
//!
//! 1. **Resolve**: sync path to a folder reference (empty path = account root)
//! 2. **List**: entries under that folder, optionally recursive
//! 3. **Synthesize**: classify entries and build file, folder and root nodes
//! 4. **Content**: one engine task per file node, all joined before step 5
//! 5. **Publish**: create-or-update every node in synthesis order
//! 6. **Sweep**: remove graph nodes the pass neither published nor touched,
//!    so entries deleted remotely disappear
//!
//! A lookup or listing failure degrades the pass to an empty node set and
//! leaves the graph store as it was. The sweep is skipped when any node
//! failed to publish, since its previous version was not refreshed.
//! Per-node failures are isolated and collected in the [`SyncReport`].

use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use dbxsource_core::config::SourceConfig;
use dbxsource_core::domain::SyncNode;
use dbxsource_core::ports::{IGraphStore, IRemoteClient};
use dbxsource_core::usecases::NodeSynthesizer;

use crate::engine::{ContentSource, ContentSyncEngine, NodeSyncOutcome};
use crate::report::{NodeFailure, SyncReport, INTERNAL_FAILURE};

/// Nodes produced by a pass together with its report
#[derive(Debug, Clone)]
pub struct SyncPassOutput {
    pub nodes: Vec<SyncNode>,
    pub report: SyncReport,
}

/// Runs sync passes for one source configuration
pub struct SyncOrchestrator {
    config: SourceConfig,
    remote: Arc<dyn IRemoteClient>,
    graph: Arc<dyn IGraphStore>,
    engine: ContentSyncEngine,
    synthesizer: NodeSynthesizer,
}

impl SyncOrchestrator {
    pub fn new(
        config: SourceConfig,
        remote: Arc<dyn IRemoteClient>,
        graph: Arc<dyn IGraphStore>,
        engine: ContentSyncEngine,
    ) -> Self {
        let synthesizer = NodeSynthesizer::from_config(&config);
        Self {
            config,
            remote,
            graph,
            engine,
            synthesizer,
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Lists the remote tree and synthesizes the nodes of a pass
    ///
    /// Touches neither the content nor the stores.
    ///
    /// # Errors
    ///
    /// Returns the lookup or listing failure.
    #[tracing::instrument(skip(self), fields(path = %self.config.path))]
    pub async fn plan(&self) -> Result<Vec<SyncNode>> {
        let folder = self
            .remote
            .resolve_folder_id(&self.config.path)
            .await
            .context("Failed to resolve sync root")?;

        let entries = self
            .remote
            .list_entries(&folder, self.config.recursive)
            .await
            .context("Failed to list sync root")?;
        debug!(folder = %folder, entries = entries.len(), "Listing received");

        Ok(self.synthesizer.synthesize(&entries))
    }

    /// Performs one full sync pass
    ///
    /// Never fails; degraded outcomes are reported in [`SyncPassOutput::report`].
    #[tracing::instrument(skip(self), fields(path = %self.config.path))]
    pub async fn run_sync_pass(&self) -> SyncPassOutput {
        let start = Instant::now();
        let pass_start = Utc::now();
        let mut report = SyncReport::default();

        info!(
            recursive = self.config.recursive,
            folder_nodes = self.config.create_folder_nodes,
            "Starting sync pass"
        );

        let planned = match self.plan().await {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "Listing failed; pass yields no nodes");
                report.listing_failed = true;
                report.duration_ms = start.elapsed().as_millis() as u64;
                return SyncPassOutput {
                    nodes: Vec::new(),
                    report,
                };
            }
        };

        let nodes = self.sync_content(planned, &mut report).await;
        self.publish(&nodes, &mut report).await;
        self.sweep(pass_start, &mut report).await;

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            published = report.nodes_published,
            cache_hits = report.cache_hits,
            downloads = report.downloads,
            removed = report.nodes_removed,
            failures = report.failures.len(),
            duration_ms = report.duration_ms,
            "Sync pass complete"
        );

        SyncPassOutput { nodes, report }
    }

    /// Runs the engine concurrently over the file nodes, preserving order
    async fn sync_content(&self, nodes: Vec<SyncNode>, report: &mut SyncReport) -> Vec<SyncNode> {
        let mut slots: Vec<Option<SyncNode>> = Vec::with_capacity(nodes.len());
        let mut unfinished = BTreeSet::new();
        let mut tasks: JoinSet<(usize, NodeSyncOutcome)> = JoinSet::new();

        for (index, node) in nodes.into_iter().enumerate() {
            if !node.is_file() {
                slots.push(Some(node));
                continue;
            }

            report.file_nodes += 1;
            let engine = self.engine.clone();
            let fallback = node.clone();
            slots.push(Some(node.clone()));
            unfinished.insert(index);
            tasks.spawn(async move {
                let outcome = AssertUnwindSafe(engine.sync_node(node))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|panic| {
                        NodeSyncOutcome::aborted(fallback, panic_message(&*panic))
                    });
                (index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    unfinished.remove(&index);
                    record_outcome(report, &outcome);
                    slots[index] = Some(outcome.node);
                }
                // Panics are caught inside the task; only cancellation lands here
                // and the slot keeps the node without content.
                Err(err) => error!(error = %err, "Content sync task did not complete"),
            }
        }

        record_unfinished(report, &slots, &unfinished);
        slots.into_iter().flatten().collect()
    }

    async fn publish(&self, nodes: &[SyncNode], report: &mut SyncReport) {
        for node in nodes {
            match self.graph.create_or_update_node(node).await {
                Ok(()) => report.nodes_published += 1,
                Err(err) => {
                    let failure = NodeFailure::from_error(node.id(), &err);
                    warn!(node_id = %node.id(), error = %failure.reason, "Publish failed");
                    report.publish_failures.push(failure);
                }
            }
        }
    }

    async fn sweep(&self, pass_start: DateTime<Utc>, report: &mut SyncReport) {
        if !report.publish_failures.is_empty() {
            let reason = format!(
                "skipped: {} node(s) failed to publish",
                report.publish_failures.len()
            );
            warn!(reason = %reason, "Untouched nodes kept");
            report.sweep_error = Some(reason);
            return;
        }

        match self.graph.remove_untouched_since(pass_start).await {
            Ok(removed) => {
                report.nodes_removed = removed;
                if removed > 0 {
                    info!(removed, "Removed nodes no longer present remotely");
                }
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(error = %reason, "Failed to remove untouched nodes");
                report.sweep_error = Some(reason);
            }
        }
    }
}

fn record_outcome(report: &mut SyncReport, outcome: &NodeSyncOutcome) {
    match outcome.source {
        Some(ContentSource::Cache) => report.cache_hits += 1,
        Some(ContentSource::Remote) => report.downloads += 1,
        None => {}
    }
    if let Some(failure) = &outcome.failure {
        report.failures.push(failure.clone());
    }
    report.warnings.extend(outcome.warnings.iter().cloned());
}

/// File nodes whose task never reported back are published without content
fn record_unfinished(
    report: &mut SyncReport,
    slots: &[Option<SyncNode>],
    unfinished: &BTreeSet<usize>,
) {
    for node in unfinished.iter().filter_map(|&i| slots.get(i).and_then(Option::as_ref)) {
        report.failures.push(NodeFailure::new(
            node.id(),
            INTERNAL_FAILURE,
            "content sync task did not complete",
        ));
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("content sync panicked: {detail}")
}
