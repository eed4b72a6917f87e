//! API constants

/// Versioned prefix of every domain route
pub const API_PREFIX: &str = "/api/v1";

/// Where the local media backend's files are served from
pub const MEDIA_ROUTE: &str = "/media";
