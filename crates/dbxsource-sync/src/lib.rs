//! dbxsource Sync - Content synchronization for a single pass
//!
//! Provides:
//! - Per-node content resolution against the materialization cache
//! - The pass orchestrator (listing, synthesis, concurrent content sync, publish)
//! - A filesystem blob materializer with content-addressed storage
//!
//! ## Modules
//!
//! - [`engine`] - Content state machine driving cache lookups and downloads
//! - [`orchestrator`] - One sync pass from listing to publication
//! - [`materializer`] - Streaming download into the local content store
//! - [`report`] - Non-fatal outcome of a pass

pub mod engine;
pub mod materializer;
pub mod orchestrator;
pub mod report;

#[cfg(test)]
mod testing;

pub use engine::{ContentSource, ContentSyncEngine, NodeSyncOutcome};
pub use materializer::FsBlobMaterializer;
pub use orchestrator::{SyncOrchestrator, SyncPassOutput};
pub use report::{NodeFailure, SyncReport};

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised inside the sync crate before they are classified
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error occurred while writing content
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The download request failed or returned a non-success status
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// The target file name would escape the content directory
    #[error("Invalid content name: {0:?}")]
    InvalidContentName(String),

    /// The content directory cannot be used
    #[error("Content directory unavailable: {0}")]
    ContentDirUnavailable(PathBuf),

    /// A domain-level error propagated from dbxsource-core
    #[error("Domain error: {0}")]
    DomainError(#[from] dbxsource_core::domain::DomainError),
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::DownloadFailed(e.to_string())
    }
}
