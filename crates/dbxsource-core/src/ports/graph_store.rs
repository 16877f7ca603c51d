//! Graph store port (driven/secondary port)
//!
//! The host data layer that receives nodes. All writes have
//! create-or-update semantics keyed by node id. Every write also counts as a
//! touch; nodes a pass neither wrote nor touched are swept at its end.

use chrono::{DateTime, Utc};

use crate::domain::{ContentDigest, LocalFileRef, NodeId, SyncNode};

/// Port trait for the host graph store
#[async_trait::async_trait]
pub trait IGraphStore: Send + Sync {
    /// Publishes a node, replacing any previous node with the same id
    async fn create_or_update_node(&self, node: &SyncNode) -> anyhow::Result<()>;

    /// Registers the file node backing a materialized blob
    async fn create_or_update_file(
        &self,
        file: &LocalFileRef,
        digest: &ContentDigest,
    ) -> anyhow::Result<()>;

    /// Marks an existing node as still current for this pass
    ///
    /// Unknown ids are not an error.
    async fn mark_node_fresh(&self, id: &NodeId, digest: &ContentDigest) -> anyhow::Result<()>;

    /// Removes every node last written or touched before `since`
    ///
    /// Returns the number of removed nodes.
    async fn remove_untouched_since(&self, since: DateTime<Utc>) -> anyhow::Result<u64>;
}
