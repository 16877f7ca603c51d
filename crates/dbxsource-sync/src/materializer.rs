//! Filesystem blob materializer (secondary/driven adapter)
//!
//! Implements [`IBlobMaterializer`] by streaming a temporary link into the
//! local content store.
//!
//! ## Layout
//!
//! ```text
//! {content_dir}/
//!   .incoming/<sha256(parent)>.part     in-flight download
//!   ab/cdef.../<name><extension>        final file, keyed by sha256 of the bytes
//! ```
//!
//! Bytes are hashed while they are written; the final path is only known
//! once the download completes, so the temporary file is renamed into place.
//! Identical content for the same name lands on the same path.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use dbxsource_core::domain::{ContentDigest, LocalFileRef, NodeId, SourceError};
use dbxsource_core::ports::IBlobMaterializer;

use crate::SyncError;

const INCOMING_DIR: &str = ".incoming";

/// Content-addressed store of downloaded files
#[derive(Debug, Clone)]
pub struct FsBlobMaterializer {
    http: reqwest::Client,
    content_dir: PathBuf,
}

impl FsBlobMaterializer {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self::with_client(reqwest::Client::new(), content_dir)
    }

    pub fn with_client(http: reqwest::Client, content_dir: impl Into<PathBuf>) -> Self {
        Self {
            http,
            content_dir: content_dir.into(),
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Final location of a file with the given content hash
    pub fn blob_path(&self, content_hash: &str, file_name: &str) -> PathBuf {
        let (prefix, rest) = content_hash.split_at(content_hash.len().min(2));
        self.content_dir.join(prefix).join(rest).join(file_name)
    }

    async fn download(
        &self,
        url: &str,
        file_name: &str,
        parent: &NodeId,
    ) -> Result<LocalFileRef, SyncError> {
        let incoming = self.content_dir.join(INCOMING_DIR);
        tokio::fs::create_dir_all(&incoming)
            .await
            .map_err(|_| SyncError::ContentDirUnavailable(incoming.clone()))?;

        let part = incoming.join(format!(
            "{}.part",
            ContentDigest::of_bytes(parent.as_str().as_bytes())
        ));

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::DownloadFailed(format!("HTTP {status}")));
        }

        let mut file = tokio::fs::File::create(&part).await?;
        let mut hasher = Sha256::new();
        let mut size: u64 = 0;
        let mut stream = response.bytes_stream();

        let written: Result<(), SyncError> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                hasher.update(&chunk);
                size += chunk.len() as u64;
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            file.sync_all().await?;
            Ok(())
        }
        .await;
        drop(file);

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }

        let content_hash = format!("{:x}", hasher.finalize());
        let target = self.blob_path(&content_hash, file_name);
        if let Some(dir) = target.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::rename(&part, &target).await?;

        debug!(path = %target.display(), size, "Blob stored");
        Ok(LocalFileRef::new(parent.clone(), target, content_hash, size))
    }
}

fn file_name(name: &str, extension: &str) -> Result<String, SyncError> {
    let file_name = format!("{name}{extension}");
    let invalid = name.is_empty()
        || file_name == "."
        || file_name == ".."
        || file_name.contains('/')
        || file_name.contains('\0');
    if invalid {
        return Err(SyncError::InvalidContentName(file_name));
    }
    Ok(file_name)
}

#[async_trait::async_trait]
impl IBlobMaterializer for FsBlobMaterializer {
    #[instrument(skip(self, url))]
    async fn materialize(
        &self,
        url: &str,
        name: &str,
        extension: &str,
        parent: &NodeId,
    ) -> anyhow::Result<LocalFileRef> {
        let materialize_error = |e: SyncError| SourceError::Materialize {
            name: format!("{name}{extension}"),
            reason: e.to_string(),
        };

        let target_name = file_name(name, extension).map_err(materialize_error)?;
        let local = self
            .download(url, &target_name, parent)
            .await
            .map_err(materialize_error)?;
        Ok(local)
    }

    async fn is_present(&self, file: &LocalFileRef) -> bool {
        match tokio::fs::metadata(&file.path).await {
            Ok(meta) => meta.is_file() && meta.len() == file.size,
            Err(_) => false,
        }
    }
}
