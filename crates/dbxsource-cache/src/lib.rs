//! dbxsource Cache - Local state persistence
//!
//! SQLite-backed adapters for:
//! - The per-node materialization cache (`ICacheStore`)
//! - The published node graph (`IGraphStore`)
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with schema setup
//! - [`SqliteCacheStore`] - `ICacheStore` implementation
//! - [`SqliteGraphStore`] - `IGraphStore` implementation with read helpers
//! - [`CacheError`] - Error types for storage operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use dbxsource_cache::{DatabasePool, SqliteCacheStore, SqliteGraphStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let db = DatabasePool::new(Path::new("/home/user/.local/share/dbxsource/dbxsource.db")).await?;
//! let cache = SqliteCacheStore::new(db.pool().clone());
//! let graph = SqliteGraphStore::new(db.pool().clone());
//! # Ok(())
//! # }
//! ```

pub mod cache_store;
pub mod graph_store;
pub mod pool;

pub use cache_store::SqliteCacheStore;
pub use graph_store::{SqliteGraphStore, StoredNode};
pub use pool::DatabasePool;

use dbxsource_core::domain::SourceError;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema setup failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Serialization or deserialization of domain types failed
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::QueryFailed(e.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::SerializationError(e.to_string())
    }
}

impl From<CacheError> for SourceError {
    fn from(e: CacheError) -> Self {
        SourceError::Cache(e.to_string())
    }
}
