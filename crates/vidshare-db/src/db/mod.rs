//! Database repositories for data access layer
//!
//! Each repository is responsible for a specific domain entity and provides CRUD operations
//! and the joined read-model queries behind the listing endpoints.

pub mod comment;
pub mod dashboard;
pub mod engagement;
pub mod playlist;
pub mod resource;
mod rows;
pub mod tweet;
pub mod user;
pub mod video;

pub use comment::CommentRepository;
pub use dashboard::DashboardRepository;
pub use engagement::EngagementRepository;
pub use playlist::PlaylistRepository;
pub use resource::ResourceRepository;
pub use tweet::TweetRepository;
pub use user::UserRepository;
pub use video::VideoRepository;
