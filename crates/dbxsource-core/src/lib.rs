//! dbxsource Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `RemoteEntry`, `SyncNode`, `CacheEntry`, `LocalFileRef`
//! - **Use cases** - `EntryClassifier`, `NodeSynthesizer`
//! - **Port definitions** - Traits for adapters: `IRemoteClient`, `IGraphStore`,
//!   `IBlobMaterializer`, `ICacheStore`
//! - **State machine** - Per-node content resolution states
//! - **Schema** - Type definitions contributed to the host graph
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.

pub mod config;
pub mod domain;
pub mod ports;
pub mod schema;
pub mod usecases;
