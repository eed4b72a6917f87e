use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidshare_core::models::{ChannelProfile, NewUser, Page, Pagination, User, WatchHistoryEntry};
use vidshare_core::AppError;

use super::rows::{HistoryRow, OWNER_COLUMNS, VIDEO_COLUMNS};

const USER_COLUMNS: &str = "id, username, email, full_name, avatar, cover_image, password_hash, \
     refresh_token, created_at, updated_at";

/// Repository for user accounts, channel profiles and watch history
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, user), fields(db.table = "users", db.operation = "insert"))]
    pub async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            INSERT INTO users (username, email, full_name, password_hash, avatar, cover_image)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(&user.avatar)
        .bind(&user.cover_image)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select", db.record_id = %id))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Look up a login by email or username, whichever is given
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn find_by_login(
        &self,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            SELECT {} FROM users
            WHERE ($1::TEXT IS NOT NULL AND email = $1)
               OR ($2::TEXT IS NOT NULL AND username = $2)
            LIMIT 1
            "#,
            USER_COLUMNS
        ))
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Whether either the username or the email is already registered
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn exists(&self, username: &str, email: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self, token), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    pub async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, password_hash), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    pub async fn update_account(
        &self,
        id: Uuid,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            r#"
            UPDATE users SET
                full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(full_name)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    pub async fn update_avatar(&self, id: Uuid, url: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            "UPDATE users SET avatar = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(url)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    pub async fn update_cover_image(&self, id: Uuid, url: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<Postgres, User>(&format!(
            "UPDATE users SET cover_image = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(url)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Public channel page with subscription counts relative to `viewer`
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn channel_profile(
        &self,
        username: &str,
        viewer: Uuid,
    ) -> Result<Option<ChannelProfile>, AppError> {
        let profile = sqlx::query_as::<Postgres, ChannelProfile>(
            r#"
            SELECT u.id, u.username, u.email, u.full_name, u.avatar, u.cover_image,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id) AS subscribers_count,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id) AS channels_subscribed_to_count,
                EXISTS(
                    SELECT 1 FROM subscriptions s
                    WHERE s.channel_id = u.id AND s.subscriber_id = $2
                ) AS is_subscribed
            FROM users u
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .bind(viewer)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Remember that `user_id` watched `video_id`; re-watching moves it to the top.
    #[tracing::instrument(skip(self), fields(db.table = "watch_history", db.operation = "upsert"))]
    pub async fn record_watch(&self, user_id: Uuid, video_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO watch_history (user_id, video_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, video_id) DO UPDATE SET watched_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "watch_history", db.operation = "select"))]
    pub async fn watch_history(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> Result<Page<WatchHistoryEntry>, AppError> {
        let total = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM watch_history WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<Postgres, HistoryRow>(&format!(
            r#"
            SELECT {}, {}, h.watched_at
            FROM watch_history h
            JOIN videos v ON v.id = h.video_id
            JOIN users u ON u.id = v.owner_id
            WHERE h.user_id = $1
            ORDER BY h.watched_at DESC
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
            rows.into_iter().map(WatchHistoryEntry::from).collect(),
            total,
            pagination,
        ))
    }
}
