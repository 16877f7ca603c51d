//! Use cases (interactors) for dbxsource
//!
//! Pure, synchronous steps of a sync pass that turn a remote listing into
//! graph nodes. The I/O-bound steps (content sync, publishing) live in the
//! `dbxsource-sync` crate.
//!
//! ## Use Cases
//!
//! - [`EntryClassifier`] - Partition entries into files and folders, filter by extension
//! - [`NodeSynthesizer`] - Build file, folder and root nodes from classified entries

pub mod build_nodes;
pub mod classify_entries;

pub use build_nodes::NodeSynthesizer;
pub use classify_entries::EntryClassifier;
