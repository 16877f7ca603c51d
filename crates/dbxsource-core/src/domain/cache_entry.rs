//! Persisted materialization state of a node

use serde::{Deserialize, Serialize};

use super::newtypes::ContentDigest;
use super::node::LocalFileRef;

/// What was materialized for a node, and for which digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub local_file: LocalFileRef,
    pub content_digest: ContentDigest,
}

impl CacheEntry {
    pub fn new(local_file: LocalFileRef, content_digest: ContentDigest) -> Self {
        Self {
            local_file,
            content_digest,
        }
    }

    /// True when the entry was written for exactly `digest`
    pub fn is_fresh_for(&self, digest: &ContentDigest) -> bool {
        &self.content_digest == digest
    }
}
