//! Dropbox API HTTP client
//!
//! Provides a typed HTTP client for the Dropbox API v2 RPC endpoints.
//! Handles authentication headers, JSON bodies, and mapping of HTTP status
//! codes to [`DropboxError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dbxsource_dropbox::client::DropboxClient;
//! use dbxsource_dropbox::files;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DropboxClient::new("access-token-here");
//! let page = files::list_folder(&client, "", true).await?;
//! println!("Got {} entries", page.entries.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::DropboxError;

/// Base URL for Dropbox API RPC endpoints
const DROPBOX_API_URL: &str = "https://api.dropboxapi.com";

/// Default retry-after duration when the header is missing or unparseable
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Error body returned by RPC endpoints on 4xx/409 responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_summary: Option<String>,
}

/// HTTP client for Dropbox API calls
///
/// Wraps `reqwest::Client` with the bearer token and base URL.
#[derive(Debug, Clone)]
pub struct DropboxClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl DropboxClient {
    /// Creates a new DropboxClient with the given access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(access_token, DROPBOX_API_URL)
    }

    /// Creates a new DropboxClient with a custom base URL (useful for testing)
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to base URL (e.g., "/2/files/list_folder")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Calls an RPC endpoint with a JSON body and decodes the JSON result
    pub async fn rpc<B, R>(&self, path: &str, body: &B) -> Result<R, DropboxError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(path, "Dropbox RPC");

        let response = self.request(Method::POST, path).json(body).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            DropboxError::InvalidResponse(format!("failed to decode {path} response: {e}"))
        })
    }
}

/// Maps a non-success response to a [`DropboxError`]
async fn error_from_response(response: Response) -> DropboxError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(|v| parse_retry_after(v, DEFAULT_RETRY_AFTER))
        .unwrap_or(DEFAULT_RETRY_AFTER);

    let body = response.text().await.unwrap_or_default();
    let summary = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(|b| b.error_summary)
        .unwrap_or(body);

    classify_status(status, summary, retry_after)
}

fn classify_status(status: StatusCode, summary: String, retry_after: Duration) -> DropboxError {
    match status {
        StatusCode::UNAUTHORIZED => DropboxError::Unauthorized(summary),
        StatusCode::CONFLICT if is_not_found_summary(&summary) => DropboxError::NotFound(summary),
        StatusCode::CONFLICT => DropboxError::Api(summary),
        StatusCode::TOO_MANY_REQUESTS => {
            warn!(retry_after_secs = retry_after.as_secs(), "Dropbox rate limit hit");
            DropboxError::TooManyRequests { retry_after }
        }
        StatusCode::BAD_REQUEST => DropboxError::BadRequest(summary),
        s if s.is_server_error() => DropboxError::ServerError(format!("{s}: {summary}")),
        s => DropboxError::InvalidResponse(format!("unexpected status {s}: {summary}")),
    }
}

/// Dropbox reports missing paths as `path/not_found/...` (or
/// `path_lookup/not_found/...` for some endpoints)
fn is_not_found_summary(summary: &str) -> bool {
    summary.starts_with("path/not_found") || summary.starts_with("path_lookup/not_found")
}

/// Parses a `Retry-After` value given in seconds
pub fn parse_retry_after(value: &str, default: Duration) -> Duration {
    match value.trim().parse::<u64>() {
        Ok(seconds) => Duration::from_secs(seconds),
        Err(_) => {
            warn!(value, "Could not parse Retry-After header, using default");
            default
        }
    }
}
