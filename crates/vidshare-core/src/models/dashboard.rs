use serde::Serialize;
use utoipa::ToSchema;

/// Aggregate statistics over the caller's channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub average_video_duration: f64,
    pub average_views_per_video: f64,
    pub total_subscribers: i64,
}
