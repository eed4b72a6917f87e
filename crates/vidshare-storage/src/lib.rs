//! Vidshare Storage Library
//!
//! This crate provides the media store used for video files, thumbnails, avatars, and
//! cover images: the `Storage` trait and its S3 and local filesystem implementations.
//!
//! # Storage key format
//!
//! All backends use the same key layout: `{kind}/{uuid}.{ext}`, where `kind` is one of
//! `videos`, `thumbnails`, `avatars`, `covers`. Keys must not contain `..` or a leading
//! `/`. Key generation is centralized in the `keys` module.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod probe;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{MediaKind, Storage, StorageError, StorageResult, UploadedAsset};
pub use vidshare_core::StorageBackend;
