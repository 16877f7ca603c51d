//! Content sync engine
//!
//! The [`ContentSyncEngine`] resolves the local content of one file node:
//!
//! 1. **Lookup**: read the cache entry keyed by node identity (a read error
//!    counts as a miss)
//! 2. **Fresh hit**: the stored digest equals the node's digest and the file
//!    is still on disk, reuse it and mark it fresh in the graph store
//! 3. **Stale hit / miss**: fetch a temporary link, materialize the bytes,
//!    register the file node and overwrite the cache entry
//!
//! Failures never abort the pass: the node comes back without a local file
//! and the failure is classified for the report.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use dbxsource_core::domain::{
    extension_of, stem_of, CacheEntry, CacheKey, ContentState, LocalFileRef, SourceError,
    SyncNode,
};
use dbxsource_core::ports::{IBlobMaterializer, ICacheStore, IGraphStore, IRemoteClient};

use crate::report::NodeFailure;

/// Where a resolved node's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// Reused from a fresh cache entry
    Cache,
    /// Downloaded during this pass
    Remote,
}

/// Result of syncing one file node
#[derive(Debug, Clone)]
pub struct NodeSyncOutcome {
    /// The node, with its local file attached when resolved
    pub node: SyncNode,
    /// Terminal state (`Resolved` or `Failed`)
    pub state: ContentState,
    pub source: Option<ContentSource>,
    /// Set when the node could not be resolved
    pub failure: Option<NodeFailure>,
    /// Non-fatal problems on a resolved node
    pub warnings: Vec<NodeFailure>,
}

impl NodeSyncOutcome {
    pub fn is_resolved(&self) -> bool {
        self.state == ContentState::Resolved
    }

    /// Outcome for a node whose sync task never finished
    pub fn aborted(node: SyncNode, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let failure = NodeFailure::new(node.id(), crate::report::INTERNAL_FAILURE, reason.clone());
        Self {
            node,
            state: ContentState::Failed(reason),
            source: None,
            failure: Some(failure),
            warnings: Vec::new(),
        }
    }
}

struct Resolution {
    local_file: LocalFileRef,
    source: ContentSource,
    warnings: Vec<NodeFailure>,
}

/// Per-node content resolution over the four driven ports
///
/// Cloning is cheap; every clone shares the same adapters.
#[derive(Clone)]
pub struct ContentSyncEngine {
    remote: Arc<dyn IRemoteClient>,
    graph: Arc<dyn IGraphStore>,
    materializer: Arc<dyn IBlobMaterializer>,
    cache: Arc<dyn ICacheStore>,
}

impl ContentSyncEngine {
    pub fn new(
        remote: Arc<dyn IRemoteClient>,
        graph: Arc<dyn IGraphStore>,
        materializer: Arc<dyn IBlobMaterializer>,
        cache: Arc<dyn ICacheStore>,
    ) -> Self {
        Self {
            remote,
            graph,
            materializer,
            cache,
        }
    }

    /// Resolves the content of `node`
    ///
    /// Folder and root nodes are returned untouched in the `Resolved` state.
    #[tracing::instrument(skip(self, node), fields(node_id = %node.id()))]
    pub async fn sync_node(&self, mut node: SyncNode) -> NodeSyncOutcome {
        let mut state = ContentState::Unresolved;

        if !node.is_file() {
            return NodeSyncOutcome {
                node,
                state: ContentState::Resolved,
                source: None,
                failure: None,
                warnings: Vec::new(),
            };
        }

        match self.resolve(&node, &mut state).await {
            Ok(resolution) => {
                debug!(
                    file_id = %resolution.local_file.id,
                    path = %resolution.local_file.path.display(),
                    "Content resolved"
                );
                node.attach_local_file(resolution.local_file);
                NodeSyncOutcome {
                    node,
                    state,
                    source: Some(resolution.source),
                    failure: None,
                    warnings: resolution.warnings,
                }
            }
            Err(err) => {
                let failure = NodeFailure::from_error(node.id(), &err);
                warn!(
                    kind = %failure.kind,
                    from = state.name(),
                    error = %failure.reason,
                    "Content sync failed; node is published without a local file"
                );
                if let Err(e) = state.fail(failure.reason.clone()) {
                    warn!(error = %e, "Content state already terminal");
                }
                NodeSyncOutcome {
                    node,
                    state,
                    source: None,
                    failure: Some(failure),
                    warnings: Vec::new(),
                }
            }
        }
    }

    async fn resolve(&self, node: &SyncNode, state: &mut ContentState) -> Result<Resolution> {
        let key = CacheKey::for_node(node.id());
        let digest = node.content_digest();

        let cached = match self.cache.get(&key).await {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%key, error = %format!("{err:#}"), "Cache read failed; treating as miss");
                None
            }
        };

        if let Some(entry) = cached {
            let fresh = entry.is_fresh_for(digest);
            if fresh && self.materializer.is_present(&entry.local_file).await {
                state.transition_to(ContentState::CacheHitFresh)?;
                self.graph
                    .mark_node_fresh(&entry.local_file.id, digest)
                    .await?;
                state.transition_to(ContentState::Resolved)?;
                debug!(%key, "Cache hit");
                return Ok(Resolution {
                    local_file: entry.local_file,
                    source: ContentSource::Cache,
                    warnings: Vec::new(),
                });
            }

            state.transition_to(ContentState::CacheHitStale)?;
            if fresh {
                debug!(%key, path = %entry.local_file.path.display(), "Cached file is missing");
            } else {
                debug!(
                    %key,
                    cached = %entry.content_digest,
                    current = %digest,
                    "Cache entry is stale"
                );
            }
        }

        state.transition_to(ContentState::CacheMiss)?;
        self.fetch(node, &key, state).await
    }

    async fn fetch(
        &self,
        node: &SyncNode,
        key: &CacheKey,
        state: &mut ContentState,
    ) -> Result<Resolution> {
        let remote_path = node.remote_path().ok_or_else(|| {
            anyhow!(SourceError::RemoteLink {
                path: node.local_path().to_string(),
                reason: "node has no remote path".to_string(),
            })
        })?;

        let url = self.remote.get_temporary_download_url(remote_path).await?;

        state.transition_to(ContentState::Downloading)?;
        let name = stem_of(remote_path.as_str());
        let extension = extension_of(remote_path.as_str()).unwrap_or("");
        let local_file = self
            .materializer
            .materialize(&url, name, extension, node.id())
            .await?;

        self.graph
            .create_or_update_file(&local_file, node.content_digest())
            .await?;

        let mut warnings = Vec::new();
        let entry = CacheEntry::new(local_file.clone(), node.content_digest().clone());
        if let Err(err) = self.cache.set(key, &entry).await {
            let warning = NodeFailure::from_error(node.id(), &err);
            warn!(%key, error = %warning.reason, "Cache write failed; content will be fetched again next pass");
            warnings.push(warning);
        }

        state.transition_to(ContentState::Resolved)?;
        info!(
            path = %remote_path,
            size = local_file.size,
            "Content downloaded"
        );

        Ok(Resolution {
            local_file,
            source: ContentSource::Remote,
            warnings,
        })
    }
}
