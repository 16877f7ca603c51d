//! In-memory port implementations shared by the engine and orchestrator tests

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use dbxsource_core::config::SourceConfig;
use dbxsource_core::domain::{
    CacheEntry, CacheKey, ContentDigest, EntryTag, FolderRef, LocalFileRef, NodeId, RemoteEntry,
    RemoteId, RemotePath, SourceError, SyncNode,
};
use dbxsource_core::ports::{IBlobMaterializer, ICacheStore, IGraphStore, IRemoteClient};

use crate::engine::ContentSyncEngine;
use crate::orchestrator::SyncOrchestrator;

pub fn file_entry(id: &str, path: &str, modified: &str) -> RemoteEntry {
    RemoteEntry {
        tag: EntryTag::File,
        name: path.rsplit('/').next().unwrap().to_string(),
        path_display: RemotePath::new(path.to_string()).unwrap(),
        id: RemoteId::new(id.to_string()).unwrap(),
        content_hash: None,
        client_modified: Some(modified.parse::<DateTime<Utc>>().unwrap()),
    }
}

pub fn folder_entry(id: &str, path: &str) -> RemoteEntry {
    RemoteEntry {
        tag: EntryTag::Folder,
        name: path.rsplit('/').next().unwrap().to_string(),
        path_display: RemotePath::new(path.to_string()).unwrap(),
        id: RemoteId::new(id.to_string()).unwrap(),
        content_hash: None,
        client_modified: None,
    }
}

// ============================================================================
// Remote
// ============================================================================

#[derive(Default)]
pub struct MockRemote {
    entries: Mutex<Vec<RemoteEntry>>,
    fail_lookup: AtomicBool,
    fail_listing: AtomicBool,
    link_failures: Mutex<HashSet<String>>,
    list_calls: Mutex<Vec<(FolderRef, bool)>>,
    link_calls: Mutex<Vec<String>>,
}

impl MockRemote {
    pub fn set_entries(&self, entries: Vec<RemoteEntry>) {
        *self.entries.lock().unwrap() = entries;
    }

    pub fn fail_lookup(&self, fail: bool) {
        self.fail_lookup.store(fail, Ordering::SeqCst);
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn fail_link_for(&self, path: &str) {
        self.link_failures.lock().unwrap().insert(path.to_string());
    }

    pub fn list_calls(&self) -> Vec<(FolderRef, bool)> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn link_calls(&self) -> Vec<String> {
        self.link_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl IRemoteClient for MockRemote {
    async fn resolve_folder_id(&self, path: &str) -> anyhow::Result<FolderRef> {
        if path.is_empty() {
            return Ok(FolderRef::SyncRoot);
        }
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(SourceError::RemoteLookup {
                path: path.to_string(),
                reason: "path/not_found".to_string(),
            }
            .into());
        }
        Ok(FolderRef::Id(RemoteId::new("id:folder".to_string())?))
    }

    async fn list_entries(
        &self,
        folder: &FolderRef,
        recursive: bool,
    ) -> anyhow::Result<Vec<RemoteEntry>> {
        self.list_calls
            .lock()
            .unwrap()
            .push((folder.clone(), recursive));
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(SourceError::RemoteList("network down".to_string()).into());
        }
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn get_temporary_download_url(&self, path: &RemotePath) -> anyhow::Result<String> {
        self.link_calls.lock().unwrap().push(path.to_string());
        if self.link_failures.lock().unwrap().contains(path.as_str()) {
            return Err(SourceError::RemoteLink {
                path: path.to_string(),
                reason: "path/not_found".to_string(),
            }
            .into());
        }
        Ok(format!("https://dl.example{path}"))
    }
}

// ============================================================================
// Graph store
// ============================================================================

#[derive(Default)]
pub struct MockGraph {
    published: Mutex<Vec<SyncNode>>,
    files: Mutex<Vec<(LocalFileRef, ContentDigest)>>,
    fresh: Mutex<Vec<(NodeId, ContentDigest)>>,
    fail_files: AtomicBool,
    rejected: Mutex<HashSet<String>>,
    sweeps: Mutex<Vec<DateTime<Utc>>>,
    fail_sweep: AtomicBool,
}

impl MockGraph {
    pub fn published(&self) -> Vec<SyncNode> {
        self.published.lock().unwrap().clone()
    }

    pub fn files(&self) -> Vec<(LocalFileRef, ContentDigest)> {
        self.files.lock().unwrap().clone()
    }

    pub fn fresh_marks(&self) -> Vec<(NodeId, ContentDigest)> {
        self.fresh.lock().unwrap().clone()
    }

    pub fn fail_file_registration(&self, fail: bool) {
        self.fail_files.store(fail, Ordering::SeqCst);
    }

    pub fn reject_node(&self, id: &str) {
        self.rejected.lock().unwrap().insert(id.to_string());
    }

    pub fn sweeps(&self) -> Vec<DateTime<Utc>> {
        self.sweeps.lock().unwrap().clone()
    }

    pub fn fail_sweep(&self, fail: bool) {
        self.fail_sweep.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl IGraphStore for MockGraph {
    async fn create_or_update_node(&self, node: &SyncNode) -> anyhow::Result<()> {
        if self.rejected.lock().unwrap().contains(node.id().as_str()) {
            return Err(SourceError::Graph("constraint failed".to_string()).into());
        }
        self.published.lock().unwrap().push(node.clone());
        Ok(())
    }

    async fn create_or_update_file(
        &self,
        file: &LocalFileRef,
        digest: &ContentDigest,
    ) -> anyhow::Result<()> {
        if self.fail_files.load(Ordering::SeqCst) {
            return Err(SourceError::Graph("database is locked".to_string()).into());
        }
        self.files
            .lock()
            .unwrap()
            .push((file.clone(), digest.clone()));
        Ok(())
    }

    async fn mark_node_fresh(&self, id: &NodeId, digest: &ContentDigest) -> anyhow::Result<()> {
        self.fresh
            .lock()
            .unwrap()
            .push((id.clone(), digest.clone()));
        Ok(())
    }

    async fn remove_untouched_since(&self, since: DateTime<Utc>) -> anyhow::Result<u64> {
        if self.fail_sweep.load(Ordering::SeqCst) {
            return Err(SourceError::Graph("database is locked".to_string()).into());
        }
        self.sweeps.lock().unwrap().push(since);
        Ok(0)
    }
}

// ============================================================================
// Materializer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MaterializeCall {
    pub url: String,
    pub name: String,
    pub extension: String,
    pub parent: NodeId,
}

#[derive(Default)]
pub struct MockMaterializer {
    calls: Mutex<Vec<MaterializeCall>>,
    fail: AtomicBool,
    panic_on: Mutex<Option<String>>,
    missing: Mutex<HashSet<PathBuf>>,
}

impl MockMaterializer {
    pub fn calls(&self) -> Vec<MaterializeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn panic_on(&self, name: &str) {
        *self.panic_on.lock().unwrap() = Some(name.to_string());
    }

    /// Simulates a stored file disappearing from disk
    pub fn remove_blob(&self, file: &LocalFileRef) {
        self.missing.lock().unwrap().insert(file.path.clone());
    }
}

#[async_trait]
impl IBlobMaterializer for MockMaterializer {
    async fn materialize(
        &self,
        url: &str,
        name: &str,
        extension: &str,
        parent: &NodeId,
    ) -> anyhow::Result<LocalFileRef> {
        if self.panic_on.lock().unwrap().as_deref() == Some(name) {
            panic!("materializer crashed on {name}");
        }
        self.calls.lock().unwrap().push(MaterializeCall {
            url: url.to_string(),
            name: name.to_string(),
            extension: extension.to_string(),
            parent: parent.clone(),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(SourceError::Materialize {
                name: format!("{name}{extension}"),
                reason: "disk full".to_string(),
            }
            .into());
        }
        Ok(LocalFileRef::new(
            parent.clone(),
            PathBuf::from(format!("/content/{name}{extension}")),
            ContentDigest::of_bytes(url.as_bytes()).to_string(),
            url.len() as u64,
        ))
    }

    async fn is_present(&self, file: &LocalFileRef) -> bool {
        !self.missing.lock().unwrap().contains(&file.path)
    }
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Default)]
pub struct MockCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MockCache {
    pub fn entry(&self, id: &NodeId) -> Option<CacheEntry> {
        self.entries
            .lock()
            .unwrap()
            .get(&CacheKey::for_node(id))
            .cloned()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ICacheStore for MockCache {
    async fn get(&self, key: &CacheKey) -> anyhow::Result<Option<CacheEntry>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SourceError::Cache("disk I/O error".to_string()).into());
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &CacheKey, entry: &CacheEntry) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SourceError::Cache("readonly database".to_string()).into());
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.clone(), entry.clone());
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

/// One set of mock ports; engines and orchestrators built from the same
/// harness share state across passes.
#[derive(Default)]
pub struct Harness {
    pub remote: Arc<MockRemote>,
    pub graph: Arc<MockGraph>,
    pub materializer: Arc<MockMaterializer>,
    pub cache: Arc<MockCache>,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(&self) -> ContentSyncEngine {
        ContentSyncEngine::new(
            self.remote.clone(),
            self.graph.clone(),
            self.materializer.clone(),
            self.cache.clone(),
        )
    }

    pub fn orchestrator(&self, config: SourceConfig) -> SyncOrchestrator {
        SyncOrchestrator::new(config, self.remote.clone(), self.graph.clone(), self.engine())
    }
}
