//! End-to-end sync passes over Dropbox (mocked), SQLite and the filesystem

use dbxsource_core::config::SourceConfig;
use dbxsource_core::domain::{ContentDigest, NodeId};

use crate::common::{
    file_json, folder_json, mount_download, mount_list_folder, mount_temporary_link, TestEnv,
};

fn config() -> SourceConfig {
    SourceConfig {
        create_folder_nodes: true,
        ..SourceConfig::default()
    }
}

#[tokio::test]
async fn test_two_passes_download_once() {
    let env = TestEnv::start().await;
    mount_list_folder(
        &env.server,
        serde_json::json!([
            file_json("id:a", "/a.md", "2024-03-01T08:00:00Z"),
            folder_json("id:sub", "/sub"),
            file_json("id:skip", "/sub/data.csv", "2024-03-01T08:00:00Z"),
        ]),
    )
    .await;
    mount_temporary_link(&env.server, "/a.md", &env.download_url("a.md"), 1).await;
    mount_download(&env.server, "a.md", b"# Hello", 1).await;

    let orchestrator = env.orchestrator(config());
    let first = orchestrator.run_sync_pass().await;

    assert!(first.report.is_clean(), "{:?}", first.report);
    assert_eq!(first.report.downloads, 1);
    assert_eq!(first.report.nodes_published, 3);
    let local = first.nodes[0].local_file().cloned().expect("materialized");
    assert_eq!(std::fs::read(&local.path).unwrap(), b"# Hello");
    assert_eq!(local.content_hash, ContentDigest::of_bytes(b"# Hello").to_string());

    let second = orchestrator.run_sync_pass().await;

    assert_eq!(second.report.cache_hits, 1);
    assert_eq!(second.report.downloads, 0);
    assert_eq!(second.nodes, first.nodes);
    assert_eq!(env.cache.entry_count().await.unwrap(), 1);

    let stored = env
        .graph
        .get_node(&NodeId::new("id:a".to_string()).unwrap())
        .await
        .unwrap()
        .expect("published");
    assert_eq!(stored.node_type, "dropboxMarkdown");
    assert_eq!(stored.data["directory"], "root");
    assert_eq!(stored.data["localFile"]["id"], local.id.as_str());

    let file_node = env.graph.get_node(&local.id).await.unwrap().expect("file node");
    assert_eq!(&file_node.content_digest, first.nodes[0].content_digest());

    env.db.close().await;
}

#[tokio::test]
async fn test_listing_error_publishes_nothing() {
    let env = TestEnv::start().await;

    let out = env.orchestrator(config()).run_sync_pass().await;

    assert!(out.report.listing_failed);
    assert!(out.nodes.is_empty());
    assert!(env.graph.list_nodes(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_link_publishes_node_without_file() {
    let env = TestEnv::start().await;
    mount_list_folder(
        &env.server,
        serde_json::json!([file_json("id:g", "/gone.md", "2024-03-01T08:00:00Z")]),
    )
    .await;

    let out = env.orchestrator(config()).run_sync_pass().await;

    assert_eq!(out.report.failures.len(), 1);
    assert_eq!(out.report.failures[0].kind, "remote_link");
    assert!(out.nodes[0].local_file().is_none());
    assert_eq!(out.report.nodes_published, 2);
}

async fn graph_ids(env: &TestEnv) -> Vec<String> {
    env.graph
        .list_nodes(None)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id.to_string())
        .collect()
}

#[tokio::test]
async fn test_deleted_remote_file_is_removed_from_graph() {
    let env = TestEnv::start().await;
    let flat = SourceConfig::default();
    mount_list_folder(
        &env.server,
        serde_json::json!([
            file_json("id:a", "/a.md", "2024-03-01T08:00:00Z"),
            file_json("id:b", "/b.md", "2024-03-01T08:00:00Z"),
        ]),
    )
    .await;
    mount_temporary_link(&env.server, "/a.md", &env.download_url("a.md"), 1).await;
    mount_temporary_link(&env.server, "/b.md", &env.download_url("b.md"), 1).await;
    mount_download(&env.server, "a.md", b"alpha", 1).await;
    mount_download(&env.server, "b.md", b"beta", 1).await;

    let orchestrator = env.orchestrator(flat);
    let first = orchestrator.run_sync_pass().await;
    assert!(first.report.is_clean(), "{:?}", first.report);
    assert_eq!(graph_ids(&env).await.len(), 4);
    let kept_file = first.nodes[0].local_file().cloned().expect("materialized");

    env.server.verify().await;
    env.server.reset().await;
    mount_list_folder(
        &env.server,
        serde_json::json!([file_json("id:a", "/a.md", "2024-03-01T08:00:00Z")]),
    )
    .await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let second = orchestrator.run_sync_pass().await;

    assert_eq!(second.report.cache_hits, 1);
    assert_eq!(second.report.nodes_removed, 2);
    let mut expected = vec!["id:a".to_string(), kept_file.id.to_string()];
    expected.sort();
    assert_eq!(graph_ids(&env).await, expected);
}

#[tokio::test]
async fn test_listing_error_keeps_previous_graph() {
    let env = TestEnv::start().await;
    mount_list_folder(
        &env.server,
        serde_json::json!([file_json("id:a", "/a.md", "2024-03-01T08:00:00Z")]),
    )
    .await;
    mount_temporary_link(&env.server, "/a.md", &env.download_url("a.md"), 1).await;
    mount_download(&env.server, "a.md", b"alpha", 1).await;

    let orchestrator = env.orchestrator(config());
    orchestrator.run_sync_pass().await;
    let before = graph_ids(&env).await;

    env.server.verify().await;
    env.server.reset().await;
    let out = orchestrator.run_sync_pass().await;

    assert!(out.report.listing_failed);
    assert_eq!(out.report.nodes_removed, 0);
    assert_eq!(graph_ids(&env).await, before);
}

#[tokio::test]
async fn test_missing_blob_is_downloaded_again() {
    let env = TestEnv::start().await;
    mount_list_folder(
        &env.server,
        serde_json::json!([file_json("id:a", "/a.md", "2024-03-01T08:00:00Z")]),
    )
    .await;
    mount_temporary_link(&env.server, "/a.md", &env.download_url("a.md"), 2).await;
    mount_download(&env.server, "a.md", b"alpha", 2).await;

    let orchestrator = env.orchestrator(config());
    let first = orchestrator.run_sync_pass().await;
    let local = first.nodes[0].local_file().cloned().expect("materialized");
    std::fs::remove_file(&local.path).unwrap();

    let second = orchestrator.run_sync_pass().await;

    assert_eq!(second.report.cache_hits, 0);
    assert_eq!(second.report.downloads, 1);
    assert_eq!(second.nodes[0].local_file(), Some(&local));
    assert_eq!(std::fs::read(&local.path).unwrap(), b"alpha");
}
