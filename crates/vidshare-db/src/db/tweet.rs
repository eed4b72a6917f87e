use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidshare_core::models::{Page, Pagination, Tweet, TweetWithOwner};
use vidshare_core::AppError;

use super::rows::{TweetOwnerRow, OWNER_COLUMNS};

const TWEET_COLUMNS: &str = "t.id, t.content, t.owner_id, t.created_at, t.updated_at";

#[derive(Clone)]
pub struct TweetRepository {
    pool: PgPool,
}

impl TweetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, content), fields(db.table = "tweets", db.operation = "insert"))]
    pub async fn create(&self, owner_id: Uuid, content: &str) -> Result<Tweet, AppError> {
        let tweet = sqlx::query_as::<Postgres, Tweet>(
            r#"
            INSERT INTO tweets (owner_id, content)
            VALUES ($1, $2)
            RETURNING id, content, owner_id, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(tweet)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tweets", db.operation = "select", db.record_id = %id))]
    pub async fn find_with_owner(&self, id: Uuid) -> Result<Option<TweetWithOwner>, AppError> {
        let row = sqlx::query_as::<Postgres, TweetOwnerRow>(&format!(
            r#"
            SELECT {}, {},
                (SELECT COUNT(*) FROM likes l WHERE l.tweet_id = t.id) AS likes_count
            FROM tweets t
            JOIN users u ON u.id = t.owner_id
            WHERE t.id = $1
            "#,
            TWEET_COLUMNS, OWNER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TweetWithOwner::from))
    }

    /// Newest-first page of a user's tweets with like counts
    #[tracing::instrument(skip(self), fields(db.table = "tweets", db.operation = "select"))]
    pub async fn list_by_owner(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> Result<Page<TweetWithOwner>, AppError> {
        let total =
            sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM tweets WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<Postgres, TweetOwnerRow>(&format!(
            r#"
            SELECT {}, {},
                (SELECT COUNT(*) FROM likes l WHERE l.tweet_id = t.id) AS likes_count
            FROM tweets t
            JOIN users u ON u.id = t.owner_id
            WHERE t.owner_id = $1
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT $2 OFFSET $3
            "#,
            TWEET_COLUMNS, OWNER_COLUMNS
        ))
        .bind(owner_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(TweetWithOwner::from).collect(),
            total,
            pagination,
        ))
    }

    #[tracing::instrument(skip(self, content), fields(db.table = "tweets", db.operation = "update", db.record_id = %id))]
    pub async fn update_content(&self, id: Uuid, content: &str) -> Result<Tweet, AppError> {
        let tweet = sqlx::query_as::<Postgres, Tweet>(
            r#"
            UPDATE tweets SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, content, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(tweet)
    }

    #[tracing::instrument(skip(self), fields(db.table = "tweets", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
