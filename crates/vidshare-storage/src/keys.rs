//! Shared key generation for storage backends.
//!
//! Key format: `{kind}/{uuid}.{ext}`.

use std::path::Path;
use uuid::Uuid;

use crate::traits::{MediaKind, StorageError, StorageResult};

/// File extension for an upload, preferring the declared content type over the path.
pub fn extension_for(content_type: &str, local_path: &Path) -> String {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let from_type = match essence.as_str() {
        "video/mp4" => Some("mp4"),
        "video/quicktime" => Some("mov"),
        "video/webm" => Some("webm"),
        "video/x-matroska" => Some("mkv"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    };

    if let Some(ext) = from_type {
        return ext.to_string();
    }

    local_path
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}

/// Generate a fresh storage key. All backends must use this format for consistency.
pub fn generate_storage_key(kind: MediaKind, content_type: &str, local_path: &Path) -> String {
    format!(
        "{}/{}.{}",
        kind.prefix(),
        Uuid::new_v4(),
        extension_for(content_type, local_path)
    )
}

/// Reject keys that could escape the store root.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Strip `base_url` from a public URL, leaving the key.
pub fn key_from_base_url(base_url: &str, url: &str) -> Option<String> {
    let base = base_url.trim_end_matches('/');
    let key = url.strip_prefix(base)?.strip_prefix('/')?;
    let key = key.split(['?', '#']).next().unwrap_or_default();
    validate_key(key).ok()?;
    Some(key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn key_layout_follows_kind_and_content_type() {
        let key = generate_storage_key(MediaKind::Video, "video/mp4", &PathBuf::from("/tmp/.tmpA1"));
        assert!(key.starts_with("videos/"));
        assert!(key.ends_with(".mp4"));

        let key = generate_storage_key(MediaKind::Avatar, "image/png; charset=binary", Path::new("x"));
        assert!(key.starts_with("avatars/"));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn extension_falls_back_to_path_then_bin() {
        assert_eq!(extension_for("application/octet-stream", Path::new("a/b.MOV")), "mov");
        assert_eq!(extension_for("application/octet-stream", Path::new("a/b")), "bin");
        assert_eq!(extension_for("", Path::new("a/b.t%x")), "bin");
    }

    #[test]
    fn traversal_keys_are_rejected() {
        assert!(validate_key("videos/a.mp4").is_ok());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("").is_err());
    }

    #[test]
    fn key_recovered_from_url() {
        let base = "http://localhost:8000/media/";
        assert_eq!(
            key_from_base_url(base, "http://localhost:8000/media/thumbnails/x.png?v=2"),
            Some("thumbnails/x.png".to_string())
        );
        assert_eq!(key_from_base_url(base, "https://elsewhere.example/x.png"), None);
        assert_eq!(key_from_base_url(base, "http://localhost:8000/media/../secret"), None);
    }
}
