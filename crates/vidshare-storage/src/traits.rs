//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What an uploaded asset is used for; decides its key prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Thumbnail,
    Avatar,
    Cover,
}

impl MediaKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            MediaKind::Video => "videos",
            MediaKind::Thumbnail => "thumbnails",
            MediaKind::Avatar => "avatars",
            MediaKind::Cover => "covers",
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaKind::Video)
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.prefix())
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    pub key: String,
    pub url: String,
    /// Playback length in seconds, for video uploads whose container could be probed
    pub duration: Option<f64>,
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait. Handlers only
/// ever hold an `Arc<dyn Storage>` and never depend on a concrete backend.
///
/// Entities persist the public URL, not the key, so removal goes through
/// [`Storage::delete_by_url`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload the file at `local_path` under a fresh `{kind}/{uuid}.{ext}` key
    async fn upload(
        &self,
        kind: MediaKind,
        local_path: &Path,
        content_type: &str,
    ) -> StorageResult<UploadedAsset>;

    /// Delete a file by its storage key
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Recover the storage key from a public URL produced by this backend
    fn key_from_url(&self, url: &str) -> Option<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Delete a file by the public URL stored on an entity
    async fn delete_by_url(&self, url: &str) -> StorageResult<()> {
        let key = self
            .key_from_url(url)
            .ok_or_else(|| StorageError::InvalidKey(format!("URL not served by this store: {}", url)))?;
        self.delete(&key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_prefixes() {
        assert_eq!(MediaKind::Video.prefix(), "videos");
        assert_eq!(MediaKind::Thumbnail.prefix(), "thumbnails");
        assert_eq!(MediaKind::Avatar.to_string(), "avatars");
        assert_eq!(MediaKind::Cover.to_string(), "covers");
        assert!(MediaKind::Video.is_video());
        assert!(!MediaKind::Cover.is_video());
    }
}
