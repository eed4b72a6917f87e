//! Data models for the application
//!
//! Entities mirror the database tables one-to-one; the `*WithOwner` and summary types are
//! the denormalized read-model projections returned by listing endpoints.

mod comment;
mod dashboard;
mod engagement;
mod owner;
mod pagination;
mod playlist;
mod tweet;
mod user;
mod video;

pub use comment::*;
pub use dashboard::*;
pub use engagement::*;
pub use owner::*;
pub use pagination::*;
pub use playlist::*;
pub use tweet::*;
pub use user::*;
pub use video::*;
