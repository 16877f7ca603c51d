//! Graph node entities
//!
//! A [`SyncNode`] is the canonical unit published to the graph store. File
//! and folder nodes are derived from remote entries; the root folder node is
//! synthetic. Every node carries a content digest over its semantic fields
//! (never its id), which drives cache invalidation in the sync engine.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::digest::DigestFields;
use super::entry::{extension_of, RemoteEntry};
use super::newtypes::{ContentDigest, NodeId, RemotePath};

/// Parent marker carried by every node sourced from the remote
pub const PARENT_MARKER: &str = "__SOURCE__";

/// Fixed identity of the synthetic root folder node
pub const ROOT_NODE_ID: &str = "dropboxRoot";

/// Name of the virtual root all local paths are namespaced under
pub const ROOT_NAME: &str = "root";

/// Local path of the root folder node
pub const ROOT_LOCAL_PATH: &str = "root/";

// ============================================================================
// NodeKind
// ============================================================================

/// Closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    DefaultFile,
    MarkdownFile,
    ImageFile,
    Folder,
    RootFolder,
}

impl NodeKind {
    /// Kind of a file node, chosen by extension when typed kinds are enabled
    pub fn for_file(extension: Option<&str>, typed: bool) -> Self {
        if !typed {
            return NodeKind::DefaultFile;
        }
        match extension {
            Some(".md") => NodeKind::MarkdownFile,
            Some(".png") | Some(".jpg") | Some(".jpeg") => NodeKind::ImageFile,
            _ => NodeKind::DefaultFile,
        }
    }

    /// Type name in the graph store
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::DefaultFile => "dropboxNode",
            NodeKind::MarkdownFile => "dropboxMarkdown",
            NodeKind::ImageFile => "dropboxImage",
            NodeKind::Folder | NodeKind::RootFolder => "dropboxFolder",
        }
    }

    /// Stable, distinct name used in digests and persisted data
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::DefaultFile => "default_file",
            NodeKind::MarkdownFile => "markdown_file",
            NodeKind::ImageFile => "image_file",
            NodeKind::Folder => "folder",
            NodeKind::RootFolder => "root_folder",
        }
    }

    /// File-kind nodes go through content sync
    pub fn is_file(&self) -> bool {
        match self {
            NodeKind::DefaultFile | NodeKind::MarkdownFile | NodeKind::ImageFile => true,
            NodeKind::Folder | NodeKind::RootFolder => false,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// LocalFileRef
// ============================================================================

/// Reference to a materialized local file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalFileRef {
    /// Graph id of the materialized file node
    pub id: NodeId,
    /// Node that owns the file
    pub parent: NodeId,
    pub path: PathBuf,
    /// SHA-256 hex of the bytes
    pub content_hash: String,
    pub size: u64,
}

impl LocalFileRef {
    /// Builds a reference whose id is derived from `parent` and `content_hash`
    pub fn new(parent: NodeId, path: PathBuf, content_hash: String, size: u64) -> Self {
        let seed = format!("{}:{}", parent.as_str(), content_hash);
        let id = NodeId::from_digest("file", &ContentDigest::of_bytes(seed.as_bytes()));
        Self {
            id,
            parent,
            path,
            content_hash,
            size,
        }
    }
}

// ============================================================================
// SyncNode
// ============================================================================

/// Canonical node published to the graph store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncNode {
    id: NodeId,
    parent: String,
    #[serde(rename = "dbxPath", skip_serializing_if = "Option::is_none", default)]
    remote_path: Option<RemotePath>,
    #[serde(rename = "path")]
    local_path: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    directory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    folder_path: Option<String>,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    last_modified: Option<DateTime<Utc>>,
    kind: NodeKind,
    content_digest: ContentDigest,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    local_file: Option<LocalFileRef>,
}

impl SyncNode {
    /// File node for a remote file entry
    pub fn file(entry: &RemoteEntry, kind: NodeKind) -> Self {
        let local_path = local_path_for(&entry.path_display);
        let directory = dirname(&local_path).to_string();
        Self::assemble(
            NodeId::from_remote(&entry.id),
            Some(entry.path_display.clone()),
            local_path,
            Some(directory),
            None,
            entry.name.clone(),
            entry.client_modified,
            kind,
        )
    }

    /// Folder node for a remote folder entry
    pub fn folder(entry: &RemoteEntry) -> Self {
        let local_path = local_path_for(&entry.path_display);
        let directory = dirname(&local_path).to_string();
        let folder_path = local_path.trim_end_matches('/').to_string();
        Self::assemble(
            NodeId::from_remote(&entry.id),
            Some(entry.path_display.clone()),
            local_path,
            Some(directory),
            Some(folder_path),
            entry.name.clone(),
            None,
            NodeKind::Folder,
        )
    }

    /// The synthetic root folder node
    pub fn root() -> Self {
        Self::assemble(
            NodeId::root(),
            None,
            ROOT_LOCAL_PATH.to_string(),
            None,
            Some(ROOT_NAME.to_string()),
            ROOT_NAME.to_string(),
            None,
            NodeKind::RootFolder,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        id: NodeId,
        remote_path: Option<RemotePath>,
        local_path: String,
        directory: Option<String>,
        folder_path: Option<String>,
        name: String,
        last_modified: Option<DateTime<Utc>>,
        kind: NodeKind,
    ) -> Self {
        let content_digest = DigestFields::new()
            .field("localPath", local_path.as_str())
            .optional("directory", directory.as_deref())
            .optional("folderPath", folder_path.as_deref())
            .field("name", name.as_str())
            .optional("lastModified", last_modified.map(format_timestamp))
            .field("kind", kind.as_str())
            .digest();

        Self {
            id,
            parent: PARENT_MARKER.to_string(),
            remote_path,
            local_path,
            directory,
            folder_path,
            name,
            last_modified,
            kind,
            content_digest,
            local_file: None,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Remote path, `None` for the synthetic root
    pub fn remote_path(&self) -> Option<&RemotePath> {
        self.remote_path.as_ref()
    }

    pub fn local_path(&self) -> &str {
        &self.local_path
    }

    /// Parent directory of the local path, `None` for the root
    pub fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    /// Link target for child files, only set on folder nodes
    pub fn folder_path(&self) -> Option<&str> {
        self.folder_path.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn content_digest(&self) -> &ContentDigest {
        &self.content_digest
    }

    pub fn local_file(&self) -> Option<&LocalFileRef> {
        self.local_file.as_ref()
    }

    /// Extension of the remote path, including the dot
    pub fn extension(&self) -> Option<&str> {
        self.remote_path
            .as_ref()
            .and_then(|path| extension_of(path.as_str()))
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Attaches the resolved local file. Does not affect the digest.
    pub fn attach_local_file(&mut self, local_file: LocalFileRef) {
        self.local_file = Some(local_file);
    }
}

fn local_path_for(remote: &RemotePath) -> String {
    format!("{}{}", ROOT_NAME, remote.as_str())
}

fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}
