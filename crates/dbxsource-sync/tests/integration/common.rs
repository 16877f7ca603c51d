//! Shared helpers for sync integration tests

use std::sync::Arc;

use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dbxsource_cache::{DatabasePool, SqliteCacheStore, SqliteGraphStore};
use dbxsource_core::config::SourceConfig;
use dbxsource_dropbox::{DropboxClient, DropboxRemoteClient};
use dbxsource_sync::{ContentSyncEngine, FsBlobMaterializer, SyncOrchestrator};

pub const TEST_TOKEN: &str = "test-access-token";

/// Everything a pass needs, wired to local fakes
pub struct TestEnv {
    pub server: MockServer,
    pub db: DatabasePool,
    pub graph: Arc<SqliteGraphStore>,
    pub cache: Arc<SqliteCacheStore>,
    pub content: TempDir,
}

impl TestEnv {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let db = DatabasePool::in_memory().await.expect("in-memory database");
        let graph = Arc::new(SqliteGraphStore::new(db.pool().clone()));
        let cache = Arc::new(SqliteCacheStore::new(db.pool().clone()));
        let content = tempfile::tempdir().expect("content dir");
        Self {
            server,
            db,
            graph,
            cache,
            content,
        }
    }

    pub fn orchestrator(&self, config: SourceConfig) -> SyncOrchestrator {
        let remote = Arc::new(DropboxRemoteClient::new(DropboxClient::with_base_url(
            TEST_TOKEN,
            self.server.uri(),
        )));
        let engine = ContentSyncEngine::new(
            remote.clone(),
            self.graph.clone(),
            Arc::new(FsBlobMaterializer::new(self.content.path())),
            self.cache.clone(),
        );
        SyncOrchestrator::new(config, remote, self.graph.clone(), engine)
    }

    pub fn download_url(&self, name: &str) -> String {
        format!("{}/dl/{name}", self.server.uri())
    }
}

pub fn file_json(id: &str, path_display: &str, modified: &str) -> serde_json::Value {
    let name = path_display.rsplit('/').next().unwrap_or(path_display);
    serde_json::json!({
        ".tag": "file",
        "name": name,
        "id": id,
        "client_modified": modified,
        "server_modified": modified,
        "rev": "015f8a8b8c0e0b0000000001",
        "size": 7,
        "path_lower": path_display.to_lowercase(),
        "path_display": path_display,
        "content_hash": format!("hash-{id}")
    })
}

pub fn folder_json(id: &str, path_display: &str) -> serde_json::Value {
    let name = path_display.rsplit('/').next().unwrap_or(path_display);
    serde_json::json!({
        ".tag": "folder",
        "name": name,
        "id": id,
        "path_lower": path_display.to_lowercase(),
        "path_display": path_display
    })
}

pub async fn mount_list_folder(server: &MockServer, entries: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": entries,
            "cursor": "AAE-cursor",
            "has_more": false
        })))
        .mount(server)
        .await;
}

/// Mounts a temporary link for `item_path`, expected `times` times
pub async fn mount_temporary_link(server: &MockServer, item_path: &str, link: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/2/files/get_temporary_link"))
        .and(body_json(serde_json::json!({ "path": item_path })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "metadata": file_json("id:linked", item_path, "2024-01-01T00:00:00Z"),
            "link": link
        })))
        .expect(times)
        .mount(server)
        .await;
}

/// Serves `body` at `/dl/{name}`, expected `times` times
pub async fn mount_download(server: &MockServer, name: &str, body: &[u8], times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/dl/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(times)
        .mount(server)
        .await;
}
