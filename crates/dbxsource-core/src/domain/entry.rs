//! Raw listing items as returned by the remote

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{RemoteId, RemotePath};

/// Kind of a listing item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryTag {
    File,
    Folder,
}

/// One item of a remote folder listing
///
/// Scoped to a single pass. `client_modified` is only present for files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub tag: EntryTag,
    pub name: String,
    pub path_display: RemotePath,
    pub id: RemoteId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_modified: Option<DateTime<Utc>>,
}

impl RemoteEntry {
    pub fn is_file(&self) -> bool {
        self.tag == EntryTag::File
    }

    pub fn is_folder(&self) -> bool {
        self.tag == EntryTag::Folder
    }

    /// Extension of the entry name, including the leading dot
    pub fn extension(&self) -> Option<&str> {
        extension_of(&self.name)
    }
}

/// Extension of the last segment of `path`, including the dot.
///
/// A name that starts with its only dot (`.env`) has no extension, and
/// neither does a name that ends with a dot.
pub fn extension_of(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) if idx == name.len() - 1 => None,
        Some(idx) => Some(&name[idx..]),
    }
}

/// Last segment of `path` with its extension removed
pub fn stem_of(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match extension_of(name) {
        Some(ext) => &name[..name.len() - ext.len()],
        None => name,
    }
}
