use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidshare_core::models::{Page, Pagination, Playlist, PlaylistDetail, PlaylistSummary, VideoWithOwner};
use vidshare_core::AppError;

use super::rows::{PlaylistOwnerRow, VideoOwnerRow, OWNER_COLUMNS, VIDEO_COLUMNS};

const PLAYLIST_COLUMNS: &str = "p.id, p.name, p.description, p.owner_id, p.created_at, p.updated_at";

/// Repository for playlists and their ordered video entries
#[derive(Clone)]
pub struct PlaylistRepository {
    pool: PgPool,
}

impl PlaylistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a playlist. A duplicate name for the same owner is a `Conflict`.
    #[tracing::instrument(skip(self, description), fields(db.table = "playlists", db.operation = "insert"))]
    pub async fn create(
        &self,
        owner_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Playlist, AppError> {
        let playlist = sqlx::query_as::<Postgres, Playlist>(
            r#"
            INSERT INTO playlists (owner_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, owner_id, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(playlist)
    }

    /// Whether `owner_id` already has a playlist called `name`, other than `except`
    #[tracing::instrument(skip(self), fields(db.table = "playlists", db.operation = "select"))]
    pub async fn name_taken(
        &self,
        owner_id: Uuid,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let taken = sqlx::query_scalar::<Postgres, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM playlists
                WHERE owner_id = $1 AND name = $2 AND id IS DISTINCT FROM $3
            )
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    /// Playlist with owner and its videos in playlist order.
    ///
    /// Unpublished videos are only listed for their own owner.
    #[tracing::instrument(skip(self), fields(db.table = "playlists", db.operation = "select", db.record_id = %id))]
    pub async fn find_detail(&self, id: Uuid, viewer: Uuid) -> Result<Option<PlaylistDetail>, AppError> {
        let row = sqlx::query_as::<Postgres, PlaylistOwnerRow>(&format!(
            "SELECT {}, {} FROM playlists p JOIN users u ON u.id = p.owner_id WHERE p.id = $1",
            PLAYLIST_COLUMNS, OWNER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let (playlist, owner) = row.into_parts();

        let videos = sqlx::query_as::<Postgres, VideoOwnerRow>(&format!(
            r#"
            SELECT {}, {}
            FROM playlist_videos pv
            JOIN videos v ON v.id = pv.video_id
            JOIN users u ON u.id = v.owner_id
            WHERE pv.playlist_id = $1 AND (v.is_published OR v.owner_id = $2)
            ORDER BY pv.position ASC
            "#,
            VIDEO_COLUMNS, OWNER_COLUMNS
        ))
        .bind(id)
        .bind(viewer)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(PlaylistDetail {
            playlist,
            owner,
            videos: videos.into_iter().map(VideoWithOwner::from).collect(),
        }))
    }

    #[tracing::instrument(skip(self), fields(db.table = "playlists", db.operation = "select"))]
    pub async fn list_by_owner(
        &self,
        owner_id: Uuid,
        pagination: Pagination,
    ) -> Result<Page<PlaylistSummary>, AppError> {
        let total =
            sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM playlists WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<Postgres, PlaylistSummary>(&format!(
            r#"
            SELECT {},
                (SELECT COUNT(*) FROM playlist_videos pv WHERE pv.playlist_id = p.id) AS video_count
            FROM playlists p
            WHERE p.owner_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#,
            PLAYLIST_COLUMNS
        ))
        .bind(owner_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(rows, total, pagination))
    }

    #[tracing::instrument(skip(self, description), fields(db.table = "playlists", db.operation = "update", db.record_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Playlist, AppError> {
        let playlist = sqlx::query_as::<Postgres, Playlist>(
            r#"
            UPDATE playlists SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(playlist)
    }

    #[tracing::instrument(skip(self), fields(db.table = "playlists", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Append a video at the end of the playlist. Adding a video twice is a no-op;
    /// returns whether the video was added.
    #[tracing::instrument(skip(self), fields(db.table = "playlist_videos", db.operation = "insert"))]
    pub async fn add_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent appends to the same playlist so positions stay distinct.
        sqlx::query("SELECT id FROM playlists WHERE id = $1 FOR UPDATE")
            .bind(playlist_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO playlist_videos (playlist_id, video_id, position)
            SELECT $1, $2, COALESCE(MAX(position) + 1, 0)
            FROM playlist_videos WHERE playlist_id = $1
            ON CONFLICT (playlist_id, video_id) DO NOTHING
            "#,
        )
        .bind(playlist_id)
        .bind(video_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE playlists SET updated_at = NOW() WHERE id = $1")
            .bind(playlist_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns whether the video was in the playlist.
    #[tracing::instrument(skip(self), fields(db.table = "playlist_videos", db.operation = "delete"))]
    pub async fn remove_video(&self, playlist_id: Uuid, video_id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
                .bind(playlist_id)
                .bind(video_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() > 0 {
            sqlx::query("UPDATE playlists SET updated_at = NOW() WHERE id = $1")
                .bind(playlist_id)
                .execute(&self.pool)
                .await?;
        }

        Ok(result.rows_affected() > 0)
    }
}
