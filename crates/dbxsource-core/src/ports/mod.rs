//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteClient`] - Remote listing and temporary download links (Dropbox)
//! - [`IGraphStore`] - Host graph store that receives published nodes
//! - [`IBlobMaterializer`] - Downloads bytes and stores them locally
//! - [`ICacheStore`] - Per-node materialization cache

pub mod blob_materializer;
pub mod cache_store;
pub mod graph_store;
pub mod remote_client;

pub use blob_materializer::IBlobMaterializer;
pub use cache_store::ICacheStore;
pub use graph_store::IGraphStore;
pub use remote_client::IRemoteClient;
