//! dbxsource Dropbox - Dropbox API v2 client
//!
//! Provides async client for:
//! - Folder lookup (`files/get_metadata`)
//! - Folder listing, optionally recursive (`files/list_folder`)
//! - Short-lived download links (`files/get_temporary_link`)
//!
//! ## Modules
//!
//! - [`client`] - Authenticated HTTP transport and status mapping
//! - [`files`] - `files/*` endpoints and response parsing
//! - [`provider`] - `IRemoteClient` implementation

pub mod client;
pub mod files;
pub mod provider;

pub use client::DropboxClient;
pub use provider::DropboxRemoteClient;

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when communicating with the Dropbox API
#[derive(Debug, Error)]
pub enum DropboxError {
    /// The access token is missing, invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The requested path does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// An endpoint-specific error (HTTP 409) other than not-found
    #[error("API error: {0}")]
    Api(String),

    /// The request was malformed (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Rate limit exceeded; retry after the specified duration
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Duration to wait before retrying
        retry_after: Duration,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl DropboxError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DropboxError::NotFound(_))
    }
}
