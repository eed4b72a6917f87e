use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::OwnerSummary;

/// Published video and its media URLs
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    /// Duration in seconds
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoWithOwner {
    #[serde(flatten)]
    pub video: Video,
    pub owner: OwnerSummary,
}

/// Single-video view with engagement counters computed at read time
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetail {
    #[serde(flatten)]
    pub video: Video,
    pub owner: OwnerSummary,
    pub likes_count: i64,
    pub sub_count: i64,
}

/// Entry of the caller's liked-videos feed. `is_liked` is always true.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideo {
    #[serde(flatten)]
    pub video: Video,
    pub owner: OwnerSummary,
    pub is_liked: bool,
    pub liked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryEntry {
    #[serde(flatten)]
    pub video: Video,
    pub owner: OwnerSummary,
    pub watched_at: DateTime<Utc>,
}

/// Insert parameters for a published video
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct VideoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

impl VideoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.thumbnail.is_none()
    }

    /// Drop text fields that equal the video's current values
    pub fn discard_unchanged(mut self, current: &Video) -> Self {
        if self.title.as_deref() == Some(current.title.as_str()) {
            self.title = None;
        }
        if self.description.as_deref() == Some(current.description.as_str()) {
            self.description = None;
        }
        self
    }
}

/// Sortable columns of the video listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSortField {
    #[default]
    CreatedAt,
    Views,
    Duration,
    Title,
}

impl VideoSortField {
    /// Accepts both the JSON field names and their column names.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "createdAt" | "created_at" => Some(VideoSortField::CreatedAt),
            "views" => Some(VideoSortField::Views),
            "duration" => Some(VideoSortField::Duration),
            "title" => Some(VideoSortField::Title),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            VideoSortField::CreatedAt => "v.created_at",
            VideoSortField::Views => "v.views",
            VideoSortField::Duration => "v.duration",
            VideoSortField::Title => "v.title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Raw query string of `GET /videos`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VideoListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Case-insensitive match against title or description
    pub query: Option<String>,
    /// One of createdAt, views, duration, title
    pub sort_by: Option<String>,
    /// asc or desc (default desc)
    pub sort_type: Option<String>,
    pub user_id: Option<String>,
}

/// Resolved filter for the video listing query
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    pub search: Option<String>,
    pub owner_id: Option<Uuid>,
    /// Unpublished videos are visible only to their owner
    pub viewer_id: Option<Uuid>,
    pub sort: VideoSortField,
    pub direction: SortDirection,
}

impl VideoFilter {
    pub fn includes_unpublished(&self) -> bool {
        matches!((self.owner_id, self.viewer_id), (Some(owner), Some(viewer)) if owner == viewer)
    }
}
