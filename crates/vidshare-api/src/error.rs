//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`. Use
//! `AppError` (or types that implement `Into<AppError>`) for errors and `?` so they become
//! `HttpAppError` and render consistently (status, envelope, logging).

use axum::{
    extract::multipart::MultipartRejection,
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use vidshare_core::{AppError, ErrorMetadata, LogLevel};
use vidshare_storage::StorageError;

/// Error envelope. Mirrors the success envelope with `success: false`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub success: bool,
    /// Always empty; kept for clients that expect the field
    pub errors: Vec<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from vidshare-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// Convert JSON body deserialization failures into a 400 with the error envelope.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        let body_text = rejection.body_text();
        let message = if body_text.contains("invalid type") {
            "Invalid request body: check that every field has the expected type".to_string()
        } else {
            format!("Invalid request body: {}", body_text)
        };
        HttpAppError(AppError::BadRequest(message))
    }
}

impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(AppError::BadRequest(format!(
            "Invalid multipart body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that deserializes, then runs the `validator` rules of `T`.
///
/// Deserialization and validation failures both render as 400 with the error envelope.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        inner.validate().map_err(AppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl HttpAppError {
    fn envelope(&self, is_production: bool) -> ErrorResponse {
        let app_error = &self.0;
        // Details only outside production, and never for sensitive errors.
        let details = if is_production || app_error.is_sensitive() {
            None
        } else {
            Some(app_error.detailed_message())
        };

        ErrorResponse {
            status_code: app_error.http_status_code(),
            message: app_error.client_message(),
            success: false,
            errors: Vec::new(),
            code: app_error.error_code().to_string(),
            details,
            suggested_action: app_error.suggested_action().map(String::from),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        let body = self.envelope(is_production_env());
        (status, Json(body)).into_response()
    }
}

// Convert storage errors to HttpAppError (avoids orphan rule: we impl for local HttpAppError)

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::UploadFailed(msg) => AppError::Storage(msg),
            StorageError::DeleteFailed(msg) => AppError::Storage(msg),
            StorageError::InvalidKey(msg) => AppError::BadRequest(msg),
            StorageError::BackendError(msg) => AppError::Storage(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn storage_not_found_maps_to_not_found() {
        let storage_err = StorageError::NotFound("missing".to_string());
        let HttpAppError(app_err) = storage_err.into();
        match app_err {
            AppError::NotFound(msg) => assert_eq!(msg, "missing"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn storage_upload_failure_maps_to_storage_error() {
        let storage_err = StorageError::UploadFailed("bucket unreachable".to_string());
        let HttpAppError(app_err) = storage_err.into();
        assert!(matches!(app_err, AppError::Storage(_)));
        assert_eq!(app_err.http_status_code(), 500);
    }

    #[test]
    fn storage_invalid_key_maps_to_bad_request() {
        let storage_err = StorageError::InvalidKey("../etc/passwd".to_string());
        let HttpAppError(app_err) = storage_err.into();
        assert!(matches!(app_err, AppError::BadRequest(_)));
    }

    #[test]
    fn storage_io_error_maps_to_internal() {
        let storage_err = StorageError::IoError(io::Error::new(io::ErrorKind::Other, "disk full"));
        let HttpAppError(app_err) = storage_err.into();
        match app_err {
            AppError::Internal(msg) => assert!(msg.contains("disk full")),
            other => panic!("Expected Internal, got {:?}", other),
        }
    }

    #[test]
    fn envelope_carries_status_and_message() {
        let err = HttpAppError(AppError::Forbidden(
            "You are not allowed to modify this video".to_string(),
        ));
        let body = serde_json::to_value(err.envelope(false)).unwrap();

        assert_eq!(body["statusCode"], 403);
        assert_eq!(body["message"], "You are not allowed to modify this video");
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"], serde_json::json!([]));
        assert_eq!(body["code"], "FORBIDDEN");
        assert!(body.get("details").is_some());
    }

    #[test]
    fn envelope_hides_details_in_production() {
        let err = HttpAppError(AppError::BadRequest("Invalid video id".to_string()));
        let body = serde_json::to_value(err.envelope(true)).unwrap();
        assert_eq!(body["message"], "Invalid video id");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn envelope_hides_sensitive_messages() {
        let err = HttpAppError(AppError::Internal("connection string leaked".to_string()));
        let body = serde_json::to_value(err.envelope(false)).unwrap();
        assert_eq!(body["statusCode"], 500);
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn into_response_uses_error_status() {
        let response = HttpAppError(AppError::Conflict(
            "You already have a playlist with this name.".to_string(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
