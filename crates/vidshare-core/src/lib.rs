//! Vidshare Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! shared by the other Vidshare crates, together with the two pieces of business logic
//! every resource handler reuses: the ownership guard and the engagement toggle.

pub mod config;
pub mod engagement;
pub mod error;
pub mod models;
pub mod ownership;
pub mod storage_types;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::{AuthConfig, BaseConfig, Config, ServiceConfig, StorageConfig, UploadConfig};
pub use engagement::{toggle, Engagement, EngagementKind, EngagementStore, ToggleOutcome};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use ownership::{guard, guard_as, GuardedResource, Owned, OwnedResource, ResourceKind, ResourceLoader};
pub use storage_types::StorageBackend;
