//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for identifiers and values
//! that flow between the remote listing, the node graph and the cache.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::errors::DomainError;
use super::node::ROOT_NODE_ID;

// ============================================================================
// Remote (Dropbox) identifiers
// ============================================================================

/// Dropbox path as displayed by the API (`path_display`)
///
/// Always absolute, e.g. `/Photos/beach.jpg`. The root of the account is `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath(String);

impl RemotePath {
    /// Create a new RemotePath
    ///
    /// # Errors
    /// Returns error if the path is not absolute, contains empty segments
    /// or a `..` traversal segment
    pub fn new(path: String) -> Result<Self, DomainError> {
        if !path.starts_with('/') {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path must start with '/': {path}"
            )));
        }

        if path.len() > 1 && path.contains("//") {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path contains invalid double slashes: {path}"
            )));
        }

        if path.split('/').any(|segment| segment == "..") {
            return Err(DomainError::InvalidRemotePath(format!(
                "Remote path contains invalid traversal: {path}"
            )));
        }

        Ok(Self(path))
    }

    /// The account root `/`
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, `None` for the root
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        if self.0 == "/" {
            return None;
        }
        self.0.rsplit('/').next()
    }
}

impl Display for RemotePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemotePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemotePath {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.0
    }
}

/// Dropbox item identifier
///
/// Format: `id:` followed by an opaque token, e.g. `id:a4ayc_80_OEAAAAAAAAAXw`.
/// Only emptiness and whitespace are rejected so that other backends' ids
/// remain representable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    /// Create a new RemoteId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains whitespace
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidRemoteId(
                "Remote ID cannot be empty".to_string(),
            ));
        }

        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(DomainError::InvalidRemoteId(format!(
                "Remote ID contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemoteId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteId> for String {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}

/// Folder to list, as resolved from the configured sync path
///
/// Dropbox addresses the account root with an empty path rather than an id,
/// so the root is a distinct variant instead of a magic string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FolderRef {
    /// The account root (configured path is empty)
    SyncRoot,
    /// A backend-native folder identifier
    Id(RemoteId),
}

impl FolderRef {
    /// Value to send as the `path` argument of a listing call
    #[must_use]
    pub fn as_api_path(&self) -> &str {
        match self {
            FolderRef::SyncRoot => "",
            FolderRef::Id(id) => id.as_str(),
        }
    }

    #[must_use]
    pub fn is_sync_root(&self) -> bool {
        matches!(self, FolderRef::SyncRoot)
    }
}

impl Display for FolderRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FolderRef::SyncRoot => write!(f, "<sync root>"),
            FolderRef::Id(id) => write!(f, "{id}"),
        }
    }
}

// ============================================================================
// Graph identifiers
// ============================================================================

/// Identifier of a node published to the graph store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    /// Create a new NodeId
    ///
    /// # Errors
    /// Returns error if the ID is empty
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.trim().is_empty() {
            return Err(DomainError::InvalidId("Node ID cannot be empty".to_string()));
        }
        Ok(Self(id))
    }

    /// Node id for an entry synchronized from the remote.
    ///
    /// The remote id is used verbatim so the node identity survives renames
    /// and moves on the remote side.
    #[must_use]
    pub fn from_remote(id: &RemoteId) -> Self {
        Self(id.as_str().to_string())
    }

    /// Id of the synthetic root folder node
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT_NODE_ID.to_string())
    }

    /// Id derived from a digest, e.g. `file-<hex>`
    #[must_use]
    pub fn from_digest(prefix: &str, digest: &ContentDigest) -> Self {
        Self(format!("{}-{}", prefix, digest.as_str()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for NodeId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Key under which a node's materialization state is cached
///
/// Derived from the node identity only, never from its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    const PREFIX: &'static str = "dropbox-file-";

    #[must_use]
    pub fn for_node(id: &NodeId) -> Self {
        Self(format!("{}{}", Self::PREFIX, id.as_str()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deterministic fingerprint over a node's semantic fields
///
/// Lowercase hex SHA-256 (64 chars).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest(String);

impl ContentDigest {
    const HEX_LEN: usize = 64;

    /// Wrap an existing hex digest
    ///
    /// # Errors
    /// Returns error if the value is not 64 lowercase hex characters
    pub fn new(digest: String) -> Result<Self, DomainError> {
        if digest.len() != Self::HEX_LEN
            || !digest
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(DomainError::InvalidDigest(format!(
                "expected {} lowercase hex characters, got '{digest}'",
                Self::HEX_LEN
            )));
        }
        Ok(Self(digest))
    }

    /// Digest of arbitrary bytes
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("{:x}", hasher.finalize()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ContentDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.0
    }
}
