//! Node synthesis
//!
//! Converts classified entries into [`SyncNode`]s. Output is a pure function
//! of the input entries and the configuration, so two passes over the same
//! listing produce identical nodes and digests.

use crate::config::SourceConfig;
use crate::domain::{extension_of, NodeKind, RemoteEntry, SyncNode};

use super::classify_entries::EntryClassifier;

/// Builds graph nodes from remote entries
#[derive(Debug, Clone)]
pub struct NodeSynthesizer {
    classifier: EntryClassifier,
    create_folder_nodes: bool,
}

impl NodeSynthesizer {
    pub fn new(classifier: EntryClassifier, create_folder_nodes: bool) -> Self {
        Self {
            classifier,
            create_folder_nodes,
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(
            EntryClassifier::from_config(config),
            config.create_folder_nodes,
        )
    }

    /// File node; typed by extension only when folder nodes are enabled
    pub fn build_file_node(&self, entry: &RemoteEntry) -> SyncNode {
        let kind = NodeKind::for_file(
            extension_of(entry.path_display.as_str()),
            self.create_folder_nodes,
        );
        SyncNode::file(entry, kind)
    }

    pub fn build_folder_node(&self, entry: &RemoteEntry) -> SyncNode {
        SyncNode::folder(entry)
    }

    /// The synthetic root node, `None` unless folder nodes are enabled
    pub fn build_root_folder_node(&self) -> Option<SyncNode> {
        self.create_folder_nodes.then(SyncNode::root)
    }

    /// Classifies `entries` and builds every node of the pass
    ///
    /// Order: file nodes in listing order, then folder nodes in listing
    /// order, then the root node.
    pub fn synthesize(&self, entries: &[RemoteEntry]) -> Vec<SyncNode> {
        let mut nodes: Vec<SyncNode> = self
            .classifier
            .classify_files(entries)
            .iter()
            .map(|entry| self.build_file_node(entry))
            .collect();

        if self.create_folder_nodes {
            nodes.extend(
                self.classifier
                    .classify_folders(entries)
                    .iter()
                    .map(|entry| self.build_folder_node(entry)),
            );
        }

        nodes.extend(self.build_root_folder_node());
        nodes
    }
}
