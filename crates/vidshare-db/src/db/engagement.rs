use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidshare_core::models::{Like, LikedVideo, OwnerSummary, Page, Pagination, Subscription, SubscriptionEntry};
use vidshare_core::{AppError, Engagement, EngagementKind, EngagementStore};

use super::rows::{LikedVideoRow, OWNER_COLUMNS, VIDEO_COLUMNS};

const LIKE_COLUMNS: &str = "id, video_id, comment_id, tweet_id, liked_by, created_at";
const SUBSCRIPTION_COLUMNS: &str = "id, subscriber_id, channel_id, created_at";

/// Target column of a like kind; `None` for subscriptions
fn like_column(kind: EngagementKind) -> Option<&'static str> {
    match kind {
        EngagementKind::VideoLike => Some("video_id"),
        EngagementKind::CommentLike => Some("comment_id"),
        EngagementKind::TweetLike => Some("tweet_id"),
        EngagementKind::Subscription => None,
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionEntryRow {
    id: Uuid,
    username: String,
    full_name: String,
    avatar: String,
    subscribed_at: chrono::DateTime<chrono::Utc>,
}

impl From<SubscriptionEntryRow> for SubscriptionEntry {
    fn from(row: SubscriptionEntryRow) -> Self {
        SubscriptionEntry {
            user: OwnerSummary {
                id: row.id,
                username: row.username,
                full_name: row.full_name,
                avatar: row.avatar,
            },
            subscribed_at: row.subscribed_at,
        }
    }
}

/// Repository for likes and subscriptions
#[derive(Clone)]
pub struct EngagementRepository {
    pool: PgPool,
}

impl EngagementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Videos liked by `user_id`, most recently liked first
    #[tracing::instrument(skip(self), fields(db.table = "likes", db.operation = "select"))]
    pub async fn liked_videos(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> Result<Page<LikedVideo>, AppError> {
        let total = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT COUNT(*) FROM likes l
            JOIN videos v ON v.id = l.video_id
            WHERE l.liked_by = $1 AND (v.is_published OR v.owner_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<Postgres, LikedVideoRow>(&format!(
            r#"
            SELECT {}, {}, l.created_at AS liked_at
            FROM likes l
            JOIN videos v ON v.id = l.video_id
            JOIN users u ON u.id = v.owner_id
            WHERE l.liked_by = $1 AND (v.is_published OR v.owner_id = $1)
            ORDER BY l.created_at DESC, l.id DESC
            LIMIT $2 OFFSET $3
            "#,
            VIDEO_COLUMNS, OWNER_COLUMNS
        ))
        .bind(user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(LikedVideo::from).collect(),
            total,
            pagination,
        ))
    }

    /// Users subscribed to `channel_id`
    #[tracing::instrument(skip(self), fields(db.table = "subscriptions", db.operation = "select"))]
    pub async fn subscribers(
        &self,
        channel_id: Uuid,
        pagination: Pagination,
    ) -> Result<Page<SubscriptionEntry>, AppError> {
        let total = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1",
        )
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<Postgres, SubscriptionEntryRow>(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar, s.created_at AS subscribed_at
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.channel_id = $1
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(channel_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(SubscriptionEntry::from).collect(),
            total,
            pagination,
        ))
    }

    /// Channels `subscriber_id` is subscribed to
    #[tracing::instrument(skip(self), fields(db.table = "subscriptions", db.operation = "select"))]
    pub async fn subscribed_channels(
        &self,
        subscriber_id: Uuid,
        pagination: Pagination,
    ) -> Result<Page<SubscriptionEntry>, AppError> {
        let total = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = $1",
        )
        .bind(subscriber_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<Postgres, SubscriptionEntryRow>(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar, s.created_at AS subscribed_at
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(subscriber_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(SubscriptionEntry::from).collect(),
            total,
            pagination,
        ))
    }
}

#[async_trait]
impl EngagementStore for EngagementRepository {
    #[tracing::instrument(skip(self), fields(db.operation = "select"))]
    async fn find(
        &self,
        kind: EngagementKind,
        target: Uuid,
        actor: Uuid,
    ) -> Result<Option<Engagement>, AppError> {
        let record = match like_column(kind) {
            Some(column) => sqlx::query_as::<Postgres, Like>(&format!(
                "SELECT {} FROM likes WHERE {} = $1 AND liked_by = $2",
                LIKE_COLUMNS, column
            ))
            .bind(target)
            .bind(actor)
            .fetch_optional(&self.pool)
            .await?
            .map(Engagement::Like),
            None => sqlx::query_as::<Postgres, Subscription>(&format!(
                "SELECT {} FROM subscriptions WHERE channel_id = $1 AND subscriber_id = $2",
                SUBSCRIPTION_COLUMNS
            ))
            .bind(target)
            .bind(actor)
            .fetch_optional(&self.pool)
            .await?
            .map(Engagement::Subscription),
        };

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.operation = "insert"))]
    async fn create(
        &self,
        kind: EngagementKind,
        target: Uuid,
        actor: Uuid,
    ) -> Result<Engagement, AppError> {
        let record = match like_column(kind) {
            Some(column) => sqlx::query_as::<Postgres, Like>(&format!(
                "INSERT INTO likes ({}, liked_by) VALUES ($1, $2) RETURNING {}",
                column, LIKE_COLUMNS
            ))
            .bind(target)
            .bind(actor)
            .fetch_one(&self.pool)
            .await
            .map(Engagement::Like)?,
            None => sqlx::query_as::<Postgres, Subscription>(&format!(
                "INSERT INTO subscriptions (channel_id, subscriber_id) VALUES ($1, $2) RETURNING {}",
                SUBSCRIPTION_COLUMNS
            ))
            .bind(target)
            .bind(actor)
            .fetch_one(&self.pool)
            .await
            .map(Engagement::Subscription)?,
        };

        Ok(record)
    }

    #[tracing::instrument(skip(self, record), fields(db.operation = "delete", db.record_id = %record.id()))]
    async fn delete(&self, kind: EngagementKind, record: &Engagement) -> Result<bool, AppError> {
        let table = match kind {
            EngagementKind::Subscription => "subscriptions",
            _ => "likes",
        };

        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table))
            .bind(record.id())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
