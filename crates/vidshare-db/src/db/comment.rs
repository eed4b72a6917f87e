use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidshare_core::models::{Comment, CommentWithOwner, Page, Pagination};
use vidshare_core::AppError;

use super::rows::{CommentOwnerRow, OWNER_COLUMNS};

const COMMENT_COLUMNS: &str =
    "c.id, c.content, c.video_id, c.owner_id, c.edited_at, c.created_at, c.updated_at";

/// Repository for video comments
#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Newest-first page of a video's comments with their authors
    #[tracing::instrument(skip(self), fields(db.table = "comments", db.operation = "select"))]
    pub async fn list_for_video(
        &self,
        video_id: Uuid,
        pagination: Pagination,
    ) -> Result<Page<CommentWithOwner>, AppError> {
        let total =
            sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM comments WHERE video_id = $1")
                .bind(video_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<Postgres, CommentOwnerRow>(&format!(
            r#"
            SELECT {}, {}
            FROM comments c
            JOIN users u ON u.id = c.owner_id
            WHERE c.video_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $2 OFFSET $3
            "#,
            COMMENT_COLUMNS, OWNER_COLUMNS
        ))
        .bind(video_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(CommentWithOwner::from).collect(),
            total,
            pagination,
        ))
    }

    #[tracing::instrument(skip(self), fields(db.table = "comments", db.operation = "select", db.record_id = %id))]
    pub async fn find_with_owner(&self, id: Uuid) -> Result<Option<CommentWithOwner>, AppError> {
        let row = sqlx::query_as::<Postgres, CommentOwnerRow>(&format!(
            "SELECT {}, {} FROM comments c JOIN users u ON u.id = c.owner_id WHERE c.id = $1",
            COMMENT_COLUMNS, OWNER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CommentWithOwner::from))
    }

    #[tracing::instrument(skip(self, content), fields(db.table = "comments", db.operation = "insert"))]
    pub async fn create(
        &self,
        video_id: Uuid,
        owner_id: Uuid,
        content: &str,
    ) -> Result<Comment, AppError> {
        let comment = sqlx::query_as::<Postgres, Comment>(
            r#"
            INSERT INTO comments (video_id, owner_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, content, video_id, owner_id, edited_at, created_at, updated_at
            "#,
        )
        .bind(video_id)
        .bind(owner_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    #[tracing::instrument(skip(self, content), fields(db.table = "comments", db.operation = "update", db.record_id = %id))]
    pub async fn update_content(&self, id: Uuid, content: &str) -> Result<Comment, AppError> {
        let comment = sqlx::query_as::<Postgres, Comment>(
            r#"
            UPDATE comments SET content = $2, edited_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING id, content, video_id, owner_id, edited_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Delete a comment; its likes cascade.
    #[tracing::instrument(skip(self), fields(db.table = "comments", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
