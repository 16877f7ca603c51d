//! Cache store port (driven/secondary port)
//!
//! Key/value persistence of [`CacheEntry`] values keyed by node identity.
//! Entries are overwritten, never deleted.

use crate::domain::{CacheEntry, CacheKey};

#[async_trait::async_trait]
pub trait ICacheStore: Send + Sync {
    /// Reads the entry stored under `key`
    async fn get(&self, key: &CacheKey) -> anyhow::Result<Option<CacheEntry>>;

    /// Creates or overwrites the entry stored under `key`
    async fn set(&self, key: &CacheKey, entry: &CacheEntry) -> anyhow::Result<()>;
}
