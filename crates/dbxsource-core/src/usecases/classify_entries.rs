//! Entry classification
//!
//! Splits a listing into file and folder entries. Files are kept only when
//! their extension is in the allow-list; everything else is dropped without
//! being reported.

use std::collections::BTreeSet;

use crate::config::SourceConfig;
use crate::domain::RemoteEntry;

/// Partitions remote entries by tag and extension
#[derive(Debug, Clone)]
pub struct EntryClassifier {
    allowed_extensions: BTreeSet<String>,
}

impl EntryClassifier {
    pub fn new(allowed_extensions: BTreeSet<String>) -> Self {
        Self { allowed_extensions }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(config.allowed_extensions())
    }

    /// File entries whose extension is allowed, in listing order
    ///
    /// Matching is exact: `.JPG` does not match `.jpg`.
    pub fn classify_files(&self, entries: &[RemoteEntry]) -> Vec<RemoteEntry> {
        entries
            .iter()
            .filter(|entry| entry.is_file())
            .filter(|entry| {
                entry
                    .extension()
                    .is_some_and(|ext| self.allowed_extensions.contains(ext))
            })
            .cloned()
            .collect()
    }

    /// Folder entries, in listing order
    pub fn classify_folders(&self, entries: &[RemoteEntry]) -> Vec<RemoteEntry> {
        entries
            .iter()
            .filter(|entry| entry.is_folder())
            .cloned()
            .collect()
    }
}
