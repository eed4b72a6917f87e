//! Vidshare API Library
//!
//! HTTP handlers, authentication, and application setup for the video-sharing backend.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod response;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use response::ApiResponse;
pub use state::AppState;
