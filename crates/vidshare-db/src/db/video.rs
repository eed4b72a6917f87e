use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use vidshare_core::models::{
    NewVideo, Page, Pagination, Video, VideoChanges, VideoDetail, VideoFilter, VideoWithOwner,
};
use vidshare_core::AppError;

use super::rows::{like_pattern, VideoDetailRow, VideoOwnerRow, OWNER_COLUMNS, VIDEO_COLUMNS};

const VIDEO_RETURNING: &str = "RETURNING id, video_file, thumbnail, title, description, duration, \
     views, is_published, owner_id, created_at, updated_at";

/// Repository for videos and the video listing read model
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &VideoFilter) {
    qb.push(" WHERE TRUE");

    if !filter.includes_unpublished() {
        qb.push(" AND v.is_published = TRUE");
    }

    if let Some(owner_id) = filter.owner_id {
        qb.push(" AND v.owner_id = ").push_bind(owner_id);
    }

    if let Some(ref search) = filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (v.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR v.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Filtered, sorted page of videos joined with their owners
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    pub async fn list(
        &self,
        filter: &VideoFilter,
        pagination: Pagination,
    ) -> Result<Page<VideoWithOwner>, AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM videos v");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {}, {} FROM videos v JOIN users u ON u.id = v.owner_id",
            VIDEO_COLUMNS, OWNER_COLUMNS
        ));
        push_filters(&mut qb, filter);
        // Sort column and direction come from closed enums, never from raw input.
        qb.push(format!(
            " ORDER BY {} {}, v.id {}",
            filter.sort.column(),
            filter.direction,
            filter.direction
        ));
        qb.push(" LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<VideoOwnerRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(Page::new(
            rows.into_iter().map(VideoWithOwner::from).collect(),
            total,
            pagination,
        ))
    }

    /// Video visible to `viewer`: published, or owned by the viewer
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    pub async fn find_visible(&self, id: Uuid, viewer: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos v WHERE v.id = $1 AND (v.is_published OR v.owner_id = $2)",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .bind(viewer)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    /// Count one view and return the video with its engagement counters.
    ///
    /// The increment and the read are one statement, so every call adds exactly one view.
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    pub async fn view(&self, id: Uuid, viewer: Uuid) -> Result<Option<VideoDetail>, AppError> {
        let row = sqlx::query_as::<Postgres, VideoDetailRow>(&format!(
            r#"
            WITH viewed AS (
                UPDATE videos SET views = views + 1
                WHERE id = $1 AND (is_published OR owner_id = $2)
                RETURNING *
            )
            SELECT {}, {},
                (SELECT COUNT(*) FROM likes l WHERE l.video_id = v.id) AS likes_count,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = v.owner_id) AS sub_count
            FROM viewed v
            JOIN users u ON u.id = v.owner_id
            "#,
            VIDEO_COLUMNS, OWNER_COLUMNS
        ))
        .bind(id)
        .bind(viewer)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(VideoDetail::from))
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert"))]
    pub async fn create(&self, video: NewVideo) -> Result<Video, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            INSERT INTO videos (owner_id, title, description, video_file, thumbnail, duration)
            VALUES ($1, $2, $3, $4, $5, $6)
            {}
            "#,
            VIDEO_RETURNING
        ))
        .bind(video.owner_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.video_file)
        .bind(&video.thumbnail)
        .bind(video.duration)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(video_id = %video.id, owner_id = %video.owner_id, "Video created");

        Ok(video)
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    pub async fn update(&self, id: Uuid, changes: &VideoChanges) -> Result<Video, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            UPDATE videos SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                thumbnail = COALESCE($4, thumbnail),
                updated_at = NOW()
            WHERE id = $1
            {}
            "#,
            VIDEO_RETURNING
        ))
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.thumbnail.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    pub async fn toggle_publish(&self, id: Uuid) -> Result<Video, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            "UPDATE videos SET is_published = NOT is_published, updated_at = NOW() WHERE id = $1 {}",
            VIDEO_RETURNING
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(video)
    }

    /// Delete a video; likes, comments, playlist entries and history rows cascade.
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
