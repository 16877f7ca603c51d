//! Dropbox `files/*` endpoints
//!
//! Wraps the three RPC calls a sync pass needs and converts their responses
//! into port-level [`RemoteEntry`] values.
//!
//! Only the first page of `list_folder` is read. When Dropbox reports
//! `has_more`, the caller receives a truncated listing together with the
//! flag so it can warn about it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use dbxsource_core::domain::{EntryTag, RemoteEntry, RemoteId, RemotePath};

use crate::client::DropboxClient;
use crate::DropboxError;

const GET_METADATA_PATH: &str = "/2/files/get_metadata";
const LIST_FOLDER_PATH: &str = "/2/files/list_folder";
const GET_TEMPORARY_LINK_PATH: &str = "/2/files/get_temporary_link";

// ============================================================================
// Dropbox API request and response types
// ============================================================================

#[derive(Debug, Serialize)]
struct PathArg<'a> {
    path: &'a str,
}

#[derive(Debug, Serialize)]
struct ListFolderArg<'a> {
    path: &'a str,
    recursive: bool,
    include_deleted: bool,
}

/// Metadata union returned by the `files/*` endpoints, discriminated by `.tag`
#[derive(Debug, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
pub(crate) enum DropboxMetadata {
    File(FileMetadata),
    Folder(FolderMetadata),
    Deleted(DeletedMetadata),
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileMetadata {
    id: String,
    name: String,
    path_display: Option<String>,
    client_modified: Option<DateTime<Utc>>,
    content_hash: Option<String>,
    #[allow(dead_code)]
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FolderMetadata {
    id: String,
    name: String,
    path_display: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeletedMetadata {
    #[allow(dead_code)]
    name: String,
    path_display: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    #[serde(default)]
    entries: Vec<DropboxMetadata>,
    cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct TemporaryLinkResponse {
    link: String,
}

// ============================================================================
// Port-level results
// ============================================================================

/// One page of a folder listing
#[derive(Debug, Clone)]
pub struct ListFolderPage {
    pub entries: Vec<RemoteEntry>,
    /// Continuation cursor; unused beyond logging
    pub cursor: Option<String>,
    /// More entries exist than were returned
    pub has_more: bool,
}

// ============================================================================
// MetadataParser - converts Dropbox metadata to RemoteEntry
// ============================================================================

/// Converts raw Dropbox metadata into [`RemoteEntry`] values
pub(crate) struct MetadataParser;

impl MetadataParser {
    /// Converts one metadata item. Deleted items and items that fail
    /// validation yield `None`.
    pub(crate) fn parse(item: DropboxMetadata) -> Option<RemoteEntry> {
        let (tag, id, name, path_display, content_hash, client_modified) = match item {
            DropboxMetadata::File(f) => (
                EntryTag::File,
                f.id,
                f.name,
                f.path_display,
                f.content_hash,
                f.client_modified,
            ),
            DropboxMetadata::Folder(f) => {
                (EntryTag::Folder, f.id, f.name, f.path_display, None, None)
            }
            DropboxMetadata::Deleted(d) => {
                debug!(path = ?d.path_display, "Skipping deleted entry");
                return None;
            }
        };

        let Some(path_display) = path_display else {
            debug!(%id, %name, "Skipping entry without path_display");
            return None;
        };

        let path_display = match RemotePath::new(path_display) {
            Ok(path) => path,
            Err(e) => {
                warn!(%id, error = %e, "Skipping entry with invalid path");
                return None;
            }
        };

        let id = match RemoteId::new(id) {
            Ok(id) => id,
            Err(e) => {
                warn!(path = %path_display, error = %e, "Skipping entry with invalid id");
                return None;
            }
        };

        Some(RemoteEntry {
            tag,
            name,
            path_display,
            id,
            content_hash,
            client_modified,
        })
    }

    pub(crate) fn parse_all(items: Vec<DropboxMetadata>) -> Vec<RemoteEntry> {
        items.into_iter().filter_map(Self::parse).collect()
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// Looks up the metadata of `path`
///
/// # Errors
///
/// `DropboxError::NotFound` when the path does not exist or was deleted.
pub async fn get_metadata(client: &DropboxClient, path: &str) -> Result<RemoteEntry, DropboxError> {
    let item: DropboxMetadata = client.rpc(GET_METADATA_PATH, &PathArg { path }).await?;
    if matches!(item, DropboxMetadata::Deleted(_)) {
        return Err(DropboxError::NotFound(format!("{path} was deleted")));
    }
    MetadataParser::parse(item)
        .ok_or_else(|| DropboxError::InvalidResponse(format!("unusable metadata for {path}")))
}

/// Lists a folder (first page only)
///
/// `path` is an empty string for the account root, a path, or an `id:` value.
pub async fn list_folder(
    client: &DropboxClient,
    path: &str,
    recursive: bool,
) -> Result<ListFolderPage, DropboxError> {
    let arg = ListFolderArg {
        path,
        recursive,
        include_deleted: false,
    };
    let response: ListFolderResponse = client.rpc(LIST_FOLDER_PATH, &arg).await?;

    let raw_count = response.entries.len();
    let entries = MetadataParser::parse_all(response.entries);
    debug!(
        path,
        recursive,
        received = raw_count,
        kept = entries.len(),
        has_more = response.has_more,
        "Listed folder"
    );

    Ok(ListFolderPage {
        entries,
        cursor: response.cursor,
        has_more: response.has_more,
    })
}

/// Issues a temporary (about four hours) download link for a file
pub async fn get_temporary_link(client: &DropboxClient, path: &str) -> Result<String, DropboxError> {
    let response: TemporaryLinkResponse =
        client.rpc(GET_TEMPORARY_LINK_PATH, &PathArg { path }).await?;
    Ok(response.link)
}
