//! Integration tests for the `files/*` endpoints and HTTP status mapping

use std::time::Duration;

use dbxsource_core::domain::EntryTag;
use dbxsource_dropbox::client::DropboxClient;
use dbxsource_dropbox::files;
use dbxsource_dropbox::DropboxError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_list_folder_returns_files_and_folders() {
    let (server, client) = common::setup_dropbox_mock().await;

    let entries = serde_json::json!([
        common::file_json("id:a", "/a.md", "2024-01-01T00:00:00Z"),
        common::folder_json("id:sub", "/sub"),
        common::file_json("id:b", "/sub/b.png", "2024-02-01T10:30:00Z"),
    ]);
    common::mount_list_folder(&server, "", true, entries, false).await;

    let page = files::list_folder(&client, "", true)
        .await
        .expect("list_folder failed");

    assert!(!page.has_more);
    assert_eq!(page.cursor.as_deref(), Some("AAE-cursor"));
    assert_eq!(page.entries.len(), 3);

    let a = &page.entries[0];
    assert_eq!(a.tag, EntryTag::File);
    assert_eq!(a.name, "a.md");
    assert_eq!(a.path_display.as_str(), "/a.md");
    assert_eq!(a.content_hash.as_deref(), Some("hash-id:a"));

    assert_eq!(page.entries[1].tag, EntryTag::Folder);
    assert_eq!(page.entries[2].path_display.as_str(), "/sub/b.png");
}

#[tokio::test]
async fn test_list_folder_ignores_deleted_entries() {
    let (server, client) = common::setup_dropbox_mock().await;

    let entries = serde_json::json!([
        { ".tag": "deleted", "name": "old.md", "path_lower": "/old.md", "path_display": "/old.md" },
        common::file_json("id:a", "/a.md", "2024-01-01T00:00:00Z"),
    ]);
    common::mount_list_folder(&server, "", false, entries, false).await;

    let page = files::list_folder(&client, "", false).await.unwrap();
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].id.as_str(), "id:a");
}

#[tokio::test]
async fn test_list_folder_reports_has_more() {
    let (server, client) = common::setup_dropbox_mock().await;
    common::mount_list_folder(&server, "id:blog", true, serde_json::json!([]), true).await;

    let page = files::list_folder(&client, "id:blog", true).await.unwrap();
    assert!(page.has_more);
    assert!(page.entries.is_empty());
}

#[tokio::test]
async fn test_get_metadata_folder() {
    let (server, client) = common::setup_dropbox_mock().await;
    common::mount_get_metadata(&server, "/blog", common::folder_json("id:blog", "/blog")).await;

    let entry = files::get_metadata(&client, "/blog").await.unwrap();
    assert!(entry.is_folder());
    assert_eq!(entry.id.as_str(), "id:blog");
}

#[tokio::test]
async fn test_get_metadata_not_found() {
    let (server, client) = common::setup_dropbox_mock().await;
    common::mount_not_found(&server, "/2/files/get_metadata").await;

    let err = files::get_metadata(&client, "/missing").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_get_temporary_link() {
    let (server, client) = common::setup_dropbox_mock().await;
    common::mount_temporary_link(&server, "/a.md", "https://dl.dropboxusercontent.com/apitl/1/abc").await;

    let link = files::get_temporary_link(&client, "/a.md").await.unwrap();
    assert_eq!(link, "https://dl.dropboxusercontent.com/apitl/1/abc");
}

#[tokio::test]
async fn test_unauthorized_maps_to_error() {
    let (server, client) = common::setup_dropbox_mock().await;
    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error_summary": "invalid_access_token/...",
            "error": { ".tag": "invalid_access_token" }
        })))
        .mount(&server)
        .await;

    let err = files::list_folder(&client, "", true).await.unwrap_err();
    match err {
        DropboxError::Unauthorized(summary) => assert!(summary.starts_with("invalid_access_token")),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_maps_retry_after() {
    let (server, client) = common::setup_dropbox_mock().await;
    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(
            ResponseTemplate::new(429)
                .append_header("Retry-After", "7")
                .set_body_string("too_many_requests"),
        )
        .mount(&server)
        .await;

    let err = files::list_folder(&client, "", true).await.unwrap_err();
    assert!(matches!(
        err,
        DropboxError::TooManyRequests { retry_after } if retry_after == Duration::from_secs(7)
    ));
}

#[tokio::test]
async fn test_server_error_maps_to_error() {
    let (server, client) = common::setup_dropbox_mock().await;
    Mock::given(method("POST"))
        .and(path("/2/files/get_temporary_link"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let err = files::get_temporary_link(&client, "/a.md").await.unwrap_err();
    assert!(matches!(err, DropboxError::ServerError(_)));
}

#[tokio::test]
async fn test_malformed_body_maps_to_invalid_response() {
    let (server, client) = common::setup_dropbox_mock().await;
    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = files::list_folder(&client, "", true).await.unwrap_err();
    assert!(matches!(err, DropboxError::InvalidResponse(_)));
}

/// Address of a local port with nothing listening on it
fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn test_network_error_when_nothing_listens() {
    let client = DropboxClient::with_base_url("token", closed_port_uri());
    let err = files::list_folder(&client, "", true).await.unwrap_err();
    assert!(matches!(err, DropboxError::NetworkError(_)));
}
