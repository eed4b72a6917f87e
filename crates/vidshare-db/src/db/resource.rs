use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidshare_core::models::{Comment, Playlist, Tweet, Video};
use vidshare_core::{AppError, OwnedResource, ResourceKind, ResourceLoader};

/// Database-backed lookup for the ownership guard: one primary-key read per check.
#[derive(Clone)]
pub struct ResourceRepository {
    pool: PgPool,
}

impl ResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceLoader for ResourceRepository {
    #[tracing::instrument(skip(self), fields(db.operation = "select", db.record_id = %id))]
    async fn load(&self, kind: ResourceKind, id: Uuid) -> Result<Option<OwnedResource>, AppError> {
        let resource = match kind {
            ResourceKind::Video => sqlx::query_as::<Postgres, Video>(
                "SELECT id, video_file, thumbnail, title, description, duration, views, \
                 is_published, owner_id, created_at, updated_at FROM videos WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(OwnedResource::Video),
            ResourceKind::Comment => sqlx::query_as::<Postgres, Comment>(
                "SELECT id, content, video_id, owner_id, edited_at, created_at, updated_at \
                 FROM comments WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(OwnedResource::Comment),
            ResourceKind::Playlist => sqlx::query_as::<Postgres, Playlist>(
                "SELECT id, name, description, owner_id, created_at, updated_at \
                 FROM playlists WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(OwnedResource::Playlist),
            ResourceKind::Tweet => sqlx::query_as::<Postgres, Tweet>(
                "SELECT id, content, owner_id, created_at, updated_at FROM tweets WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(OwnedResource::Tweet),
        };

        Ok(resource)
    }
}
