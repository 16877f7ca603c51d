//! DropboxRemoteClient - IRemoteClient implementation for the Dropbox API
//!
//! Wraps the [`DropboxClient`] and delegates to the [`files`] module to
//! fulfil the [`IRemoteClient`] port contract. Every failure is reported as
//! a [`SourceError`] so the sync layer can classify it without knowing about
//! HTTP.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use dbxsource_core::domain::{FolderRef, RemoteEntry, RemotePath, SourceError};
use dbxsource_core::ports::IRemoteClient;

use crate::client::DropboxClient;
use crate::files;

/// Dropbox-backed implementation of [`IRemoteClient`]
#[derive(Debug, Clone)]
pub struct DropboxRemoteClient {
    client: DropboxClient,
}

impl DropboxRemoteClient {
    pub fn new(client: DropboxClient) -> Self {
        Self { client }
    }

    /// Shorthand for a client against the public API
    pub fn with_token(access_token: impl Into<String>) -> Self {
        Self::new(DropboxClient::new(access_token))
    }

    pub fn client(&self) -> &DropboxClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl IRemoteClient for DropboxRemoteClient {
    async fn resolve_folder_id(&self, path: &str) -> Result<FolderRef> {
        if path.is_empty() {
            return Ok(FolderRef::SyncRoot);
        }

        let entry = files::get_metadata(&self.client, path)
            .await
            .map_err(|e| SourceError::RemoteLookup {
                path: path.to_string(),
                reason: e.to_string(),
            })
            .with_context(|| format!("Failed to resolve sync path {path}"))?;

        if !entry.is_folder() {
            return Err(SourceError::RemoteLookup {
                path: path.to_string(),
                reason: "not a folder".to_string(),
            })
            .with_context(|| format!("Failed to resolve sync path {path}"));
        }

        debug!(path, id = %entry.id, "Resolved sync folder");
        Ok(FolderRef::Id(entry.id))
    }

    async fn list_entries(&self, folder: &FolderRef, recursive: bool) -> Result<Vec<RemoteEntry>> {
        let page = files::list_folder(&self.client, folder.as_api_path(), recursive)
            .await
            .map_err(|e| SourceError::RemoteList(e.to_string()))
            .with_context(|| format!("Failed to list folder {folder}"))?;

        if page.has_more {
            warn!(
                folder = %folder,
                returned = page.entries.len(),
                "Listing truncated: only the first page is synchronized"
            );
        }

        Ok(page.entries)
    }

    async fn get_temporary_download_url(&self, path: &RemotePath) -> Result<String> {
        let link_error = |reason: String| SourceError::RemoteLink {
            path: path.to_string(),
            reason,
        };

        let link = files::get_temporary_link(&self.client, path.as_str())
            .await
            .map_err(|e| link_error(e.to_string()))
            .with_context(|| format!("Failed to get temporary link for {path}"))?;

        url::Url::parse(&link)
            .map_err(|e| link_error(format!("malformed link: {e}")))
            .with_context(|| format!("Failed to get temporary link for {path}"))?;

        Ok(link)
    }
}
