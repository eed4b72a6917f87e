//! Application state and sub-states.
//!
//! AppState is split into domain sub-states so handlers reach for what they need
//! (`state.db.videos`, `state.media.storage`) instead of a flat bag of fields.

use crate::auth::jwt::TokenService;
use std::path::PathBuf;
use std::sync::Arc;
use vidshare_core::Config;
use vidshare_db::{
    CommentRepository, DashboardRepository, EngagementRepository, PlaylistRepository,
    ResourceRepository, TweetRepository, UserRepository, VideoRepository,
};
use vidshare_storage::Storage;

use sqlx::PgPool;

// ----- Sub-state types -----

/// Database pool and all repositories.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub users: UserRepository,
    pub videos: VideoRepository,
    pub comments: CommentRepository,
    pub tweets: TweetRepository,
    pub playlists: PlaylistRepository,
    pub engagement: EngagementRepository,
    pub dashboard: DashboardRepository,
    /// Loader behind the ownership guard
    pub resources: ResourceRepository,
}

impl DbState {
    pub fn new(pool: PgPool) -> Self {
        DbState {
            users: UserRepository::new(pool.clone()),
            videos: VideoRepository::new(pool.clone()),
            comments: CommentRepository::new(pool.clone()),
            tweets: TweetRepository::new(pool.clone()),
            playlists: PlaylistRepository::new(pool.clone()),
            engagement: EngagementRepository::new(pool.clone()),
            dashboard: DashboardRepository::new(pool.clone()),
            resources: ResourceRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Media store handle and upload limits.
#[derive(Clone)]
pub struct MediaConfig {
    pub storage: Arc<dyn Storage>,
    pub video_max_file_size: usize,
    pub image_max_file_size: usize,
    /// Where multipart payloads are spooled; system temp dir when `None`
    pub temp_dir: Option<PathBuf>,
}

impl MediaConfig {
    pub fn from_config(config: &Config, storage: Arc<dyn Storage>) -> Self {
        MediaConfig {
            storage,
            video_max_file_size: config.max_video_size_bytes(),
            image_max_file_size: config.max_image_size_bytes(),
            temp_dir: config.upload_temp_dir().cloned(),
        }
    }
}

/// Token signing and cookie policy.
#[derive(Clone)]
pub struct AuthConfigState {
    pub tokens: Arc<TokenService>,
    /// Set the `Secure` attribute on auth cookies
    pub secure_cookies: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub media: MediaConfig,
    pub auth: AuthConfigState,
}
