//! Vidshare database layer
//!
//! Postgres repositories for every entity, plus the database-backed implementations of the
//! ownership guard's `ResourceLoader` and the toggle engine's `EngagementStore`.

pub mod db;

pub use db::*;
