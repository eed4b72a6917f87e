use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{OwnerSummary, VideoWithOwner};

/// Named, owner-scoped set of videos. Names are unique per owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Playlist row of a user's playlist listing
#[derive(Debug, Clone, Serialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSummary {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub playlist: Playlist,
    pub video_count: i64,
}

/// Playlist with its owner and videos in playlist order
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetail {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub owner: OwnerSummary,
    pub videos: Vec<VideoWithOwner>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePlaylistRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "Playlist name must be at most 100 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdatePlaylistRequest {
    #[serde(default)]
    #[validate(length(max = 100, message = "Playlist name must be at most 100 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}
