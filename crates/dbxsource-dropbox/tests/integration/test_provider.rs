//! Integration tests for the IRemoteClient implementation
//!
//! Verifies that adapter failures surface as `SourceError` values that the
//! sync layer can classify.

use dbxsource_core::domain::{FolderRef, RemotePath, SourceError};
use dbxsource_core::ports::IRemoteClient;
use dbxsource_dropbox::DropboxRemoteClient;

use crate::common;

#[tokio::test]
async fn test_empty_path_resolves_to_sync_root_without_request() {
    let (server, client) = common::setup_dropbox_mock().await;
    let remote = DropboxRemoteClient::new(client);

    let folder = remote.resolve_folder_id("").await.unwrap();
    assert_eq!(folder, FolderRef::SyncRoot);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resolve_folder_returns_id() {
    let (server, client) = common::setup_dropbox_mock().await;
    common::mount_get_metadata(&server, "/blog", common::folder_json("id:blog", "/blog")).await;
    let remote = DropboxRemoteClient::new(client);

    let folder = remote.resolve_folder_id("/blog").await.unwrap();
    assert_eq!(folder.as_api_path(), "id:blog");
}

#[tokio::test]
async fn test_resolve_missing_folder_is_lookup_error() {
    let (server, client) = common::setup_dropbox_mock().await;
    common::mount_not_found(&server, "/2/files/get_metadata").await;
    let remote = DropboxRemoteClient::new(client);

    let err = remote.resolve_folder_id("/missing").await.unwrap_err();
    let source = err.downcast_ref::<SourceError>().expect("SourceError");
    assert!(matches!(source, SourceError::RemoteLookup { path, .. } if path == "/missing"));
}

#[tokio::test]
async fn test_resolve_file_path_is_lookup_error() {
    let (server, client) = common::setup_dropbox_mock().await;
    common::mount_get_metadata(
        &server,
        "/a.md",
        common::file_json("id:a", "/a.md", "2024-01-01T00:00:00Z"),
    )
    .await;
    let remote = DropboxRemoteClient::new(client);

    let err = remote.resolve_folder_id("/a.md").await.unwrap_err();
    assert_eq!(err.downcast_ref::<SourceError>().map(|e| e.kind()), Some("remote_lookup"));
}

#[tokio::test]
async fn test_list_entries_passes_folder_id_and_recursion() {
    let (server, client) = common::setup_dropbox_mock().await;
    let entries = serde_json::json!([common::file_json("id:a", "/blog/a.md", "2024-01-01T00:00:00Z")]);
    common::mount_list_folder(&server, "id:blog", false, entries, true).await;
    let remote = DropboxRemoteClient::new(client);

    let folder = FolderRef::Id("id:blog".parse().unwrap());
    let listed = remote.list_entries(&folder, false).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].path_display.as_str(), "/blog/a.md");
}

#[tokio::test]
async fn test_list_failure_is_list_error() {
    let (server, client) = common::setup_dropbox_mock().await;
    common::mount_not_found(&server, "/2/files/list_folder").await;
    let remote = DropboxRemoteClient::new(client);

    let err = remote
        .list_entries(&FolderRef::SyncRoot, true)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SourceError>(),
        Some(SourceError::RemoteList(_))
    ));
}

#[tokio::test]
async fn test_temporary_link() {
    let (server, client) = common::setup_dropbox_mock().await;
    common::mount_temporary_link(&server, "/a.md", "https://dl.example.com/a").await;
    let remote = DropboxRemoteClient::new(client);

    let path = RemotePath::new("/a.md".to_string()).unwrap();
    let url = remote.get_temporary_download_url(&path).await.unwrap();
    assert_eq!(url, "https://dl.example.com/a");
}

#[tokio::test]
async fn test_temporary_link_for_missing_path_is_link_error() {
    let (server, client) = common::setup_dropbox_mock().await;
    common::mount_not_found(&server, "/2/files/get_temporary_link").await;
    let remote = DropboxRemoteClient::new(client);

    let path = RemotePath::new("/gone.md".to_string()).unwrap();
    let err = remote.get_temporary_download_url(&path).await.unwrap_err();
    match err.downcast_ref::<SourceError>() {
        Some(SourceError::RemoteLink { path, reason }) => {
            assert_eq!(path, "/gone.md");
            assert!(reason.contains("path/not_found"));
        }
        other => panic!("expected RemoteLink, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_temporary_link_is_link_error() {
    let (server, client) = common::setup_dropbox_mock().await;
    common::mount_temporary_link(&server, "/a.md", "not a url").await;
    let remote = DropboxRemoteClient::new(client);

    let path = RemotePath::new("/a.md".to_string()).unwrap();
    let err = remote.get_temporary_download_url(&path).await.unwrap_err();
    assert_eq!(err.downcast_ref::<SourceError>().map(|e| e.kind()), Some("remote_link"));
}
