use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::OwnerSummary;

/// Short text post
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: Uuid,
    pub content: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TweetWithOwner {
    #[serde(flatten)]
    pub tweet: Tweet,
    pub owner: OwnerSummary,
    pub likes_count: i64,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTweetRequest {
    #[serde(default)]
    #[validate(length(max = 280, message = "Tweet must be at most 280 characters"))]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTweetRequest {
    #[serde(default)]
    #[validate(length(max = 280, message = "Tweet must be at most 280 characters"))]
    pub new_content: Option<String>,
}
