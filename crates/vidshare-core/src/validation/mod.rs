//! Input validation helpers shared by all handlers

use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::AppError;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

static USERNAME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]{3,30}$").ok());

/// Parse a path identifier. Runs before any lookup so a malformed id is a
/// `BadRequest`, never a `NotFound`.
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest(format!("Invalid {} id", what)))
}

/// Trimmed value of a required text field; missing or blank fails with `message`.
pub fn require_text(value: Option<&str>, message: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::BadRequest(message.to_string())),
    }
}

/// Trimmed value of an optional text field; blank counts as absent.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

pub fn validate_email(email: &str) -> Result<String, AppError> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AppError::BadRequest(
            "Please enter valid email address".to_string(),
        ));
    }
    Ok(email.to_lowercase())
}

/// Usernames are 3-30 lowercase letters or digits.
pub fn validate_username(username: &str) -> Result<String, AppError> {
    let username = username.trim();
    let valid = USERNAME_PATTERN
        .as_ref()
        .map(|re| re.is_match(username))
        .unwrap_or(false);
    if !valid {
        return Err(AppError::BadRequest(
            "username should contain only lowercase alphabets and digits".to_string(),
        ));
    }
    Ok(username.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_malformed_ids_as_bad_request() {
        let err = parse_id("not-a-uuid", "video").unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert_eq!(msg, "Invalid video id"),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }

    #[test]
    fn parse_id_accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "video").unwrap(), id);
    }

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text(Some("  hi  "), "x").unwrap(), "hi");
        assert!(require_text(Some("   "), "Content required").is_err());
        assert!(require_text(None, "Content required").is_err());
    }

    #[test]
    fn optional_text_treats_blank_as_absent() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" a ")), Some("a".to_string()));
    }

    #[test]
    fn email_validation() {
        assert_eq!(validate_email(" Jane@Example.COM ").unwrap(), "jane@example.com");
        assert!(validate_email("jane@").is_err());
        assert!(validate_email("jane example@x.io").is_err());
    }

    #[test]
    fn username_validation() {
        assert!(validate_username("jane42").is_ok());
        assert!(validate_username("Jane").is_err());
        assert!(validate_username("ja").is_err());
        assert!(validate_username("jane doe").is_err());
    }
}
