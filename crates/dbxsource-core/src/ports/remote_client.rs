//! Remote listing port (driven/secondary port)
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result`; adapters attach a [`SourceError`] so callers can
//!   classify the failure without knowing the backend.
//! - Listing is a single call: continuation of truncated listings is the
//!   adapter's concern.
//!
//! [`SourceError`]: crate::domain::SourceError

use crate::domain::{FolderRef, RemoteEntry, RemotePath};

/// Port trait for the remote file tree
#[async_trait::async_trait]
pub trait IRemoteClient: Send + Sync {
    /// Resolves the configured sync path to a folder reference
    ///
    /// An empty path resolves to [`FolderRef::SyncRoot`] without a remote call.
    ///
    /// # Errors
    ///
    /// Fails with `SourceError::RemoteLookup` if the path does not exist.
    async fn resolve_folder_id(&self, path: &str) -> anyhow::Result<FolderRef>;

    /// Lists the entries of a folder, descending into subfolders when `recursive`
    ///
    /// # Errors
    ///
    /// Fails with `SourceError::RemoteList` carrying the cause.
    async fn list_entries(
        &self,
        folder: &FolderRef,
        recursive: bool,
    ) -> anyhow::Result<Vec<RemoteEntry>>;

    /// Issues a short-lived URL for fetching the bytes at `path`
    ///
    /// # Errors
    ///
    /// Fails with `SourceError::RemoteLink` if the path no longer exists.
    async fn get_temporary_download_url(&self, path: &RemotePath) -> anyhow::Result<String>;
}
