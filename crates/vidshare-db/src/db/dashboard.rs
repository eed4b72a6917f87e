use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidshare_core::models::ChannelStats;
use vidshare_core::AppError;

/// Aggregate statistics over a channel
#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Video totals and averages in one aggregate; all zero for a channel without videos.
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "aggregate"))]
    pub async fn channel_stats(&self, owner_id: Uuid) -> Result<ChannelStats, AppError> {
        let (total_videos, total_views, average_video_duration, average_views_per_video) =
            sqlx::query_as::<Postgres, (i64, i64, f64, f64)>(
                r#"
                SELECT
                    COUNT(*),
                    COALESCE(SUM(views), 0)::BIGINT,
                    COALESCE(AVG(duration), 0)::DOUBLE PRECISION,
                    COALESCE(AVG(views), 0)::DOUBLE PRECISION
                FROM videos
                WHERE owner_id = $1
                "#,
            )
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        let (total_likes, total_subscribers) = sqlx::query_as::<Postgres, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM likes l JOIN videos v ON v.id = l.video_id WHERE v.owner_id = $1),
                (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = $1)
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ChannelStats {
            total_videos,
            total_views,
            total_likes,
            average_video_duration,
            average_views_per_video,
            total_subscribers,
        })
    }
}
