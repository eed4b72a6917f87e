use uuid::Uuid;
use vidshare_core::models::{NewVideo, Video};
use vidshare_db::VideoRepository;

use super::MEDIA_BASE_URL;

/// Smallest valid PNG (1x1 transparent pixel).
pub fn create_minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Insert a published video owned by `owner` without going through upload.
pub async fn create_video(pool: &sqlx::PgPool, owner: Uuid, title: &str) -> Video {
    VideoRepository::new(pool.clone())
        .create(NewVideo {
            owner_id: owner,
            title: title.to_string(),
            description: format!("{} description", title),
            video_file: format!("{}/videos/{}.mp4", MEDIA_BASE_URL, Uuid::new_v4()),
            thumbnail: format!("{}/thumbnails/{}.png", MEDIA_BASE_URL, Uuid::new_v4()),
            duration: 42.0,
        })
        .await
        .expect("Failed to create test video")
}
