//! Domain error types
//!
//! [`DomainError`] covers validation and state-machine violations inside the
//! core. [`SourceError`] is the failure taxonomy of a sync pass: adapters
//! attach it to the `anyhow::Error` they return so the engine and the
//! orchestrator can classify failures without knowing the backend.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote path format
    #[error("Invalid remote path: {0}")]
    InvalidRemotePath(String),

    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Invalid content digest
    #[error("Invalid content digest: {0}")]
    InvalidDigest(String),

    /// Invalid state transition attempt
    #[error("Invalid state transition from {from} to {to}")]
    InvalidState {
        /// The current state
        from: String,
        /// The attempted target state
        to: String,
    },
}

/// Failure classes of a sync pass
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The configured sync path does not exist remotely
    #[error("Remote lookup failed for '{path}': {reason}")]
    RemoteLookup { path: String, reason: String },

    /// The listing call failed (network, auth, not found)
    #[error("Remote listing failed: {0}")]
    RemoteList(String),

    /// A temporary download link could not be issued
    #[error("Temporary link unavailable for '{path}': {reason}")]
    RemoteLink { path: String, reason: String },

    /// Downloading or storing the bytes failed
    #[error("Materialize failed for '{name}': {reason}")]
    Materialize { name: String, reason: String },

    /// A cache read or write failed
    #[error("Cache error: {0}")]
    Cache(String),

    /// The graph store rejected a node or file registration
    #[error("Graph store error: {0}")]
    Graph(String),
}

impl SourceError {
    /// Short, stable name of the failure class (used in reports and logs)
    pub fn kind(&self) -> &'static str {
        match self {
            SourceError::RemoteLookup { .. } => "remote_lookup",
            SourceError::RemoteList(_) => "remote_list",
            SourceError::RemoteLink { .. } => "remote_link",
            SourceError::Materialize { .. } => "materialize",
            SourceError::Cache(_) => "cache",
            SourceError::Graph(_) => "graph",
        }
    }
}
