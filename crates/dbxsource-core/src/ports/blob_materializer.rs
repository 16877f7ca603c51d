//! Local blob materializer port (driven/secondary port)

use crate::domain::{LocalFileRef, NodeId};

/// Downloads remote bytes and stores them as a local file
#[async_trait::async_trait]
pub trait IBlobMaterializer: Send + Sync {
    /// Fetches `url` and stores it as `{name}{extension}` owned by `parent`
    ///
    /// # Errors
    ///
    /// Fails with `SourceError::Materialize` on download or write errors.
    async fn materialize(
        &self,
        url: &str,
        name: &str,
        extension: &str,
        parent: &NodeId,
    ) -> anyhow::Result<LocalFileRef>;

    /// Whether a previously materialized file is still stored locally
    async fn is_present(&self, file: &LocalFileRef) -> bool;
}
