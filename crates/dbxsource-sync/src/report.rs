//! Pass report
//!
//! Nothing in a pass is fatal; everything that went wrong ends up here.

use serde::Serialize;

use dbxsource_core::domain::{NodeId, SourceError};

/// Failure kind used when an error carries no [`SourceError`]
pub const INTERNAL_FAILURE: &str = "internal";

/// A per-node problem recorded during a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeFailure {
    pub node_id: String,
    /// Stable failure class, see [`SourceError::kind`]
    pub kind: String,
    pub reason: String,
}

impl NodeFailure {
    pub fn new(node_id: &NodeId, kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            node_id: node_id.to_string(),
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Classifies `err` by the [`SourceError`] an adapter attached to it
    pub fn from_error(node_id: &NodeId, err: &anyhow::Error) -> Self {
        let kind = err
            .downcast_ref::<SourceError>()
            .map(SourceError::kind)
            .unwrap_or(INTERNAL_FAILURE);
        Self::new(node_id, kind, format!("{err:#}"))
    }
}

/// Summary of one sync pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Nodes successfully written to the graph store
    pub nodes_published: u32,
    /// File nodes that went through content sync
    pub file_nodes: u32,
    /// File nodes resolved from a fresh cache entry
    pub cache_hits: u32,
    /// File nodes whose bytes were downloaded this pass
    pub downloads: u32,
    /// File nodes published without a local file
    pub failures: Vec<NodeFailure>,
    /// Nodes the graph store rejected
    pub publish_failures: Vec<NodeFailure>,
    /// Resolved nodes with a non-fatal side effect failure
    pub warnings: Vec<NodeFailure>,
    /// Nodes removed because the pass neither published nor touched them
    pub nodes_removed: u64,
    /// Why removing untouched nodes was skipped or failed
    pub sweep_error: Option<String>,
    /// Root lookup or listing failed; the pass produced no nodes
    pub listing_failed: bool,
    pub duration_ms: u64,
}

impl SyncReport {
    /// True when every node was resolved and published
    pub fn is_clean(&self) -> bool {
        !self.listing_failed
            && self.failures.is_empty()
            && self.publish_failures.is_empty()
            && self.warnings.is_empty()
            && self.sweep_error.is_none()
    }
}
