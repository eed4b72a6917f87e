//! Multipart handling for media-bearing requests
//!
//! File parts are streamed chunk by chunk into `NamedTempFile`s, which the media store then
//! uploads from. Temp files are removed when the `UploadedFile` is dropped, whether or not the
//! upload succeeded.

use axum::extract::multipart::{Field, Multipart};
use std::collections::HashMap;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use vidshare_core::AppError;
use vidshare_storage::{MediaKind, Storage, StorageResult, UploadedAsset};

/// Accepted file part: which form field it arrives in, what it is used for, how large it may be.
#[derive(Debug, Clone, Copy)]
pub struct FileRule {
    pub field: &'static str,
    pub kind: MediaKind,
    pub max_size: usize,
}

impl FileRule {
    pub fn new(field: &'static str, kind: MediaKind, max_size: usize) -> Self {
        FileRule {
            field,
            kind,
            max_size,
        }
    }
}

/// A file part spooled to disk
#[derive(Debug)]
pub struct UploadedFile {
    pub kind: MediaKind,
    pub content_type: String,
    pub size: usize,
    file: NamedTempFile,
}

impl UploadedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn upload_to(&self, storage: &dyn Storage) -> StorageResult<UploadedAsset> {
        storage
            .upload(self.kind, self.path(), &self.content_type)
            .await
    }
}

/// Text fields and spooled files of one multipart body
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    /// Trimmed text field; blank counts as absent
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Untrimmed text field, for values such as passwords where whitespace is significant
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Read a multipart body. Parts named in `rules` are files; anything else with a filename is
/// rejected, the rest are text fields.
pub async fn read_multipart(
    mut multipart: Multipart,
    rules: &[FileRule],
    temp_dir: Option<&Path>,
) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if let Some(rule) = rules.iter().find(|r| r.field == name) {
            if form.files.contains_key(&name) {
                return Err(AppError::BadRequest(format!(
                    "Multiple files are not allowed for field '{}'",
                    name
                )));
            }
            let file = spool_file(field, rule, temp_dir).await?;
            form.files.insert(name, file);
        } else if field.file_name().is_some() {
            return Err(AppError::BadRequest(format!("Unexpected file field '{}'", name)));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read field '{}': {}", name, e)))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

async fn spool_file(
    mut field: Field<'_>,
    rule: &FileRule,
    temp_dir: Option<&Path>,
) -> Result<UploadedFile, AppError> {
    let content_type = field
        .content_type()
        .map(normalize_mime_type)
        .unwrap_or_default()
        .to_lowercase();
    validate_content_type(rule, &content_type)?;

    let temp = match temp_dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };
    let mut out = tokio::fs::File::from_std(temp.reopen()?);

    let mut size = 0usize;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?
    {
        size += chunk.len();
        validate_file_size(size, rule.max_size)?;
        out.write_all(&chunk).await?;
    }
    out.flush().await?;

    if size == 0 {
        return Err(AppError::BadRequest(format!("{} file is empty", rule.field)));
    }

    tracing::debug!(field = rule.field, size_bytes = size, content_type = %content_type, "Spooled upload");

    Ok(UploadedFile {
        kind: rule.kind,
        content_type,
        size,
        file: temp,
    })
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} MB",
            max_size / 1024 / 1024
        )));
    }
    Ok(())
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Videos must be `video/*`; every other kind is an image.
fn validate_content_type(rule: &FileRule, content_type: &str) -> Result<(), AppError> {
    let expected = if rule.kind.is_video() { "video/" } else { "image/" };
    if !content_type.starts_with(expected) {
        return Err(AppError::BadRequest(format!(
            "Invalid content type for '{}'. Expected {}*",
            rule.field, expected
        )));
    }
    Ok(())
}

/// Remove a replaced or orphaned asset. Failures are logged, never surfaced.
pub async fn discard_media(storage: &dyn Storage, url: &str) {
    if url.is_empty() {
        return;
    }
    if let Err(e) = storage.delete_by_url(url).await {
        tracing::warn!(error = %e, url = %url, "Failed to delete media asset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};

    const BOUNDARY: &str = "X-VIDSHARE-BOUNDARY";

    fn multipart_request(parts: &[(&str, Option<(&str, &str)>, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, file, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file {
                Some((filename, content_type)) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    name, filename, content_type
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn multipart(parts: &[(&str, Option<(&str, &str)>, &str)]) -> Multipart {
        Multipart::from_request(multipart_request(parts), &())
            .await
            .unwrap()
    }

    fn avatar_rule(max_size: usize) -> FileRule {
        FileRule::new("avatar", MediaKind::Avatar, max_size)
    }

    #[tokio::test]
    async fn spools_files_and_collects_text_fields() {
        let mp = multipart(&[
            ("fullName", None, "  Alice Liddell  "),
            ("avatar", Some(("me.png", "image/png")), "PNGDATA"),
        ])
        .await;

        let mut form = read_multipart(mp, &[avatar_rule(1024)], None).await.unwrap();
        assert_eq!(form.text("fullName"), Some("Alice Liddell"));

        let file = form.take_file("avatar").unwrap();
        assert_eq!(file.kind, MediaKind::Avatar);
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.size, 7);
        assert_eq!(std::fs::read(file.path()).unwrap(), b"PNGDATA");
        assert!(form.take_file("avatar").is_none());
    }

    #[tokio::test]
    async fn oversized_file_is_payload_too_large() {
        let mp = multipart(&[("avatar", Some(("me.png", "image/png")), "0123456789")]).await;
        let err = read_multipart(mp, &[avatar_rule(4)], None).await.unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[tokio::test]
    async fn wrong_content_type_is_rejected() {
        let mp = multipart(&[("avatar", Some(("me.mp4", "video/mp4")), "data")]).await;
        let err = read_multipart(mp, &[avatar_rule(1024)], None).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unexpected_file_field_is_rejected() {
        let mp = multipart(&[("payload", Some(("x.png", "image/png")), "data")]).await;
        let err = read_multipart(mp, &[avatar_rule(1024)], None).await.unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert!(msg.contains("payload")),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn temp_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let mp = multipart(&[("avatar", Some(("me.png", "image/png")), "PNGDATA")]).await;
        let mut form = read_multipart(mp, &[avatar_rule(1024)], Some(dir.path()))
            .await
            .unwrap();

        let file = form.take_file("avatar").unwrap();
        let path = file.path().to_path_buf();
        assert!(path.starts_with(dir.path()));
        assert!(path.exists());

        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn mime_parameters_are_ignored() {
        assert_eq!(normalize_mime_type("image/jpeg; charset=utf-8"), "image/jpeg");
        let rule = FileRule::new("videoFile", MediaKind::Video, 10);
        assert!(validate_content_type(&rule, "video/mp4").is_ok());
        assert!(validate_content_type(&rule, "image/png").is_err());
    }
}
