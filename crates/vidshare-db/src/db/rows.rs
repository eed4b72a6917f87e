//! Row shapes of the joined queries
//!
//! Entity columns are selected unprefixed and flattened into the entity; the joined owner's
//! public fields come back as `owner_*` aliases.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use vidshare_core::models::{
    Comment, CommentWithOwner, LikedVideo, OwnerSummary, Playlist, Tweet, TweetWithOwner, Video,
    VideoDetail, VideoWithOwner, WatchHistoryEntry,
};

pub(crate) const VIDEO_COLUMNS: &str = "v.id, v.video_file, v.thumbnail, v.title, v.description, \
     v.duration, v.views, v.is_published, v.owner_id, v.created_at, v.updated_at";

pub(crate) const OWNER_COLUMNS: &str =
    "u.username AS owner_username, u.full_name AS owner_full_name, u.avatar AS owner_avatar";

#[derive(Debug, FromRow)]
pub(crate) struct OwnerColumns {
    owner_username: String,
    owner_full_name: String,
    owner_avatar: String,
}

impl OwnerColumns {
    fn into_summary(self, id: Uuid) -> OwnerSummary {
        OwnerSummary {
            id,
            username: self.owner_username,
            full_name: self.owner_full_name,
            avatar: self.owner_avatar,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct VideoOwnerRow {
    #[sqlx(flatten)]
    video: Video,
    #[sqlx(flatten)]
    owner: OwnerColumns,
}

impl From<VideoOwnerRow> for VideoWithOwner {
    fn from(row: VideoOwnerRow) -> Self {
        let owner = row.owner.into_summary(row.video.owner_id);
        VideoWithOwner {
            video: row.video,
            owner,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct VideoDetailRow {
    #[sqlx(flatten)]
    video: Video,
    #[sqlx(flatten)]
    owner: OwnerColumns,
    likes_count: i64,
    sub_count: i64,
}

impl From<VideoDetailRow> for VideoDetail {
    fn from(row: VideoDetailRow) -> Self {
        let owner = row.owner.into_summary(row.video.owner_id);
        VideoDetail {
            video: row.video,
            owner,
            likes_count: row.likes_count,
            sub_count: row.sub_count,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct LikedVideoRow {
    #[sqlx(flatten)]
    video: Video,
    #[sqlx(flatten)]
    owner: OwnerColumns,
    liked_at: DateTime<Utc>,
}

impl From<LikedVideoRow> for LikedVideo {
    fn from(row: LikedVideoRow) -> Self {
        let owner = row.owner.into_summary(row.video.owner_id);
        LikedVideo {
            video: row.video,
            owner,
            is_liked: true,
            liked_at: row.liked_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct HistoryRow {
    #[sqlx(flatten)]
    video: Video,
    #[sqlx(flatten)]
    owner: OwnerColumns,
    watched_at: DateTime<Utc>,
}

impl From<HistoryRow> for WatchHistoryEntry {
    fn from(row: HistoryRow) -> Self {
        let owner = row.owner.into_summary(row.video.owner_id);
        WatchHistoryEntry {
            video: row.video,
            owner,
            watched_at: row.watched_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CommentOwnerRow {
    #[sqlx(flatten)]
    comment: Comment,
    #[sqlx(flatten)]
    owner: OwnerColumns,
}

impl From<CommentOwnerRow> for CommentWithOwner {
    fn from(row: CommentOwnerRow) -> Self {
        let owner = row.owner.into_summary(row.comment.owner_id);
        CommentWithOwner {
            comment: row.comment,
            owner,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TweetOwnerRow {
    #[sqlx(flatten)]
    tweet: Tweet,
    #[sqlx(flatten)]
    owner: OwnerColumns,
    likes_count: i64,
}

impl From<TweetOwnerRow> for TweetWithOwner {
    fn from(row: TweetOwnerRow) -> Self {
        let owner = row.owner.into_summary(row.tweet.owner_id);
        TweetWithOwner {
            tweet: row.tweet,
            owner,
            likes_count: row.likes_count,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PlaylistOwnerRow {
    #[sqlx(flatten)]
    playlist: Playlist,
    #[sqlx(flatten)]
    owner: OwnerColumns,
}

impl PlaylistOwnerRow {
    pub(crate) fn into_parts(self) -> (Playlist, OwnerSummary) {
        let owner = self.owner.into_summary(self.playlist.owner_id);
        (self.playlist, owner)
    }
}

/// `%term%` pattern for ILIKE with the wildcard characters of `term` escaped
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
