//! Domain entities and value objects
//!
//! - [`entry`]: raw remote listing items
//! - [`node`]: graph nodes, node kinds and local file references
//! - [`cache_entry`]: persisted materialization state
//! - [`content_state`]: per-node content resolution state machine
//! - [`digest`]: canonical content digests
//! - [`newtypes`]: validated identifiers
//! - [`errors`]: domain errors and the sync failure taxonomy

pub mod cache_entry;
pub mod content_state;
pub mod digest;
pub mod entry;
pub mod errors;
pub mod newtypes;
pub mod node;

pub use cache_entry::CacheEntry;
pub use content_state::ContentState;
pub use digest::DigestFields;
pub use entry::{extension_of, stem_of, EntryTag, RemoteEntry};
pub use errors::{DomainError, SourceError};
pub use newtypes::{CacheKey, ContentDigest, FolderRef, NodeId, RemoteId, RemotePath};
pub use node::{
    LocalFileRef, NodeKind, SyncNode, PARENT_MARKER, ROOT_LOCAL_PATH, ROOT_NAME, ROOT_NODE_ID,
};
