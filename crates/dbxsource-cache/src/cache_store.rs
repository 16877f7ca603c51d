//! SQLite implementation of ICacheStore
//!
//! | Field          | SQL Type | Strategy                          |
//! |----------------|----------|-----------------------------------|
//! | CacheKey       | TEXT     | `as_str()`                        |
//! | LocalFileRef   | TEXT     | serde_json                        |
//! | ContentDigest  | TEXT     | hex string, validated on read     |
//! | updated_at     | TEXT     | RFC 3339                          |

use anyhow::Context;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use dbxsource_core::domain::{CacheEntry, CacheKey, ContentDigest, LocalFileRef, SourceError};
use dbxsource_core::ports::ICacheStore;

use crate::CacheError;

/// SQLite-backed materialization cache
#[derive(Debug, Clone)]
pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let row = sqlx::query(
            "SELECT local_file, content_digest FROM cache_entries WHERE key = ?",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(entry_from_row).transpose()
    }

    async fn upsert(&self, key: &CacheKey, entry: &CacheEntry) -> Result<(), CacheError> {
        let local_file = serde_json::to_string(&entry.local_file)?;
        sqlx::query(
            "INSERT INTO cache_entries (key, local_file, content_digest, updated_at) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET \
                local_file = excluded.local_file, \
                content_digest = excluded.content_digest, \
                updated_at = excluded.updated_at",
        )
        .bind(key.as_str())
        .bind(local_file)
        .bind(entry.content_digest.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Number of cached entries
    pub async fn entry_count(&self) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cache_entries")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count cache entries")?;
        Ok(count.max(0) as u64)
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<CacheEntry, CacheError> {
    let local_file: String = row.try_get("local_file")?;
    let digest: String = row.try_get("content_digest")?;

    let local_file: LocalFileRef = serde_json::from_str(&local_file)?;
    let content_digest = ContentDigest::new(digest)
        .map_err(|e| CacheError::SerializationError(e.to_string()))?;

    Ok(CacheEntry::new(local_file, content_digest))
}

#[async_trait::async_trait]
impl ICacheStore for SqliteCacheStore {
    async fn get(&self, key: &CacheKey) -> anyhow::Result<Option<CacheEntry>> {
        let entry = self
            .fetch(key)
            .await
            .map_err(SourceError::from)
            .with_context(|| format!("Failed to read cache entry {key}"))?;
        debug!(%key, hit = entry.is_some(), "Cache lookup");
        Ok(entry)
    }

    async fn set(&self, key: &CacheKey, entry: &CacheEntry) -> anyhow::Result<()> {
        self.upsert(key, entry)
            .await
            .map_err(SourceError::from)
            .with_context(|| format!("Failed to write cache entry {key}"))?;
        debug!(%key, digest = %entry.content_digest, "Cache entry stored");
        Ok(())
    }
}
