//! SQLite implementation of IGraphStore
//!
//! Nodes are stored as JSON documents keyed by id. Source nodes keep their
//! graph type name (`dropboxMarkdown`, `dropboxFolder`, ...); materialized
//! files are stored under the `File` type. `created_at` survives updates,
//! `touched_at` records the last pass that wrote or confirmed the node.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC (microseconds, `Z`) so
//! that text comparison in SQL orders them chronologically.

use std::str::FromStr;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use dbxsource_core::domain::{ContentDigest, LocalFileRef, NodeId, SourceError, SyncNode};
use dbxsource_core::ports::IGraphStore;

use crate::CacheError;

/// Type name under which materialized files are stored
pub const FILE_NODE_TYPE: &str = "File";

/// A node as persisted in the graph table
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    pub id: NodeId,
    pub node_type: String,
    pub data: serde_json::Value,
    pub content_digest: ContentDigest,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub touched_at: DateTime<Utc>,
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn graph_error(e: CacheError) -> SourceError {
    SourceError::Graph(e.to_string())
}

/// SQLite-backed graph store
#[derive(Debug, Clone)]
pub struct SqliteGraphStore {
    pool: SqlitePool,
}

impl SqliteGraphStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn upsert(
        &self,
        id: &str,
        node_type: &str,
        data: String,
        digest: &ContentDigest,
    ) -> Result<(), CacheError> {
        let now = timestamp(Utc::now());
        sqlx::query(
            "INSERT INTO graph_nodes \
             (id, node_type, data, content_digest, created_at, updated_at, touched_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
                node_type = excluded.node_type, \
                data = excluded.data, \
                content_digest = excluded.content_digest, \
                updated_at = excluded.updated_at, \
                touched_at = excluded.touched_at",
        )
        .bind(id)
        .bind(node_type)
        .bind(data)
        .bind(digest.as_str())
        .bind(&now)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn touch(&self, id: &NodeId, digest: &ContentDigest) -> Result<bool, CacheError> {
        let result = sqlx::query(
            "UPDATE graph_nodes SET content_digest = ?, touched_at = ? WHERE id = ?",
        )
        .bind(digest.as_str())
        .bind(timestamp(Utc::now()))
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn sweep(&self, since: DateTime<Utc>) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM graph_nodes WHERE touched_at < ?")
            .bind(timestamp(since))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Reads a single node
    pub async fn get_node(&self, id: &NodeId) -> anyhow::Result<Option<StoredNode>> {
        let row = sqlx::query("SELECT * FROM graph_nodes WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to read node {id}"))?;

        Ok(row.as_ref().map(node_from_row).transpose()?)
    }

    /// Lists nodes ordered by id, optionally restricted to one type
    pub async fn list_nodes(&self, node_type: Option<&str>) -> anyhow::Result<Vec<StoredNode>> {
        let rows = match node_type {
            Some(t) => {
                sqlx::query("SELECT * FROM graph_nodes WHERE node_type = ? ORDER BY id")
                    .bind(t)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM graph_nodes ORDER BY id")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .context("Failed to list nodes")?;

        rows.iter()
            .map(|row| node_from_row(row).map_err(anyhow::Error::from))
            .collect()
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, CacheError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CacheError::SerializationError(format!("bad timestamp '{value}': {e}")))
}

fn node_from_row(row: &SqliteRow) -> Result<StoredNode, CacheError> {
    let id: String = row.try_get("id")?;
    let node_type: String = row.try_get("node_type")?;
    let data: String = row.try_get("data")?;
    let digest: String = row.try_get("content_digest")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let touched_at: String = row.try_get("touched_at")?;

    Ok(StoredNode {
        id: NodeId::from_str(&id).map_err(|e| CacheError::SerializationError(e.to_string()))?,
        node_type,
        data: serde_json::from_str(&data)?,
        content_digest: ContentDigest::new(digest)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        touched_at: parse_timestamp(&touched_at)?,
    })
}

#[async_trait::async_trait]
impl IGraphStore for SqliteGraphStore {
    async fn create_or_update_node(&self, node: &SyncNode) -> anyhow::Result<()> {
        let data = serde_json::to_string(node)
            .map_err(CacheError::from)
            .map_err(graph_error)?;
        self.upsert(node.id().as_str(), node.type_name(), data, node.content_digest())
            .await
            .map_err(graph_error)
            .with_context(|| format!("Failed to publish node {}", node.id()))?;
        debug!(node_id = %node.id(), node_type = node.type_name(), "Node published");
        Ok(())
    }

    async fn create_or_update_file(
        &self,
        file: &LocalFileRef,
        digest: &ContentDigest,
    ) -> anyhow::Result<()> {
        let data = serde_json::to_string(file)
            .map_err(CacheError::from)
            .map_err(graph_error)?;
        self.upsert(file.id.as_str(), FILE_NODE_TYPE, data, digest)
            .await
            .map_err(graph_error)
            .with_context(|| format!("Failed to register file node {}", file.id))?;
        debug!(node_id = %file.id, parent = %file.parent, "File node registered");
        Ok(())
    }

    async fn mark_node_fresh(&self, id: &NodeId, digest: &ContentDigest) -> anyhow::Result<()> {
        let touched = self
            .touch(id, digest)
            .await
            .map_err(graph_error)
            .with_context(|| format!("Failed to mark node {id} fresh"))?;
        if !touched {
            debug!(node_id = %id, "mark_node_fresh on unknown node ignored");
        }
        Ok(())
    }

    async fn remove_untouched_since(&self, since: DateTime<Utc>) -> anyhow::Result<u64> {
        let removed = self
            .sweep(since)
            .await
            .map_err(graph_error)
            .context("Failed to remove untouched nodes")?;
        debug!(removed, since = %since, "Untouched nodes removed");
        Ok(removed)
    }
}
