use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use vidshare_core::models::{LikedVideo, Page, Pagination, PaginationQuery};
use vidshare_core::validation::parse_id;
use vidshare_core::{toggle, AppError, Engagement, EngagementKind};

/// Result of a like or subscription toggle
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    /// `true` when the edge now exists, `false` when it was removed
    pub added: bool,
    /// The created or removed record
    pub record: Engagement,
}

/// Flip the caller's edge to `target` and wrap the outcome in the envelope.
pub(crate) async fn toggle_engagement(
    state: &AppState,
    kind: EngagementKind,
    target: Uuid,
    actor: Uuid,
) -> Result<ApiResponse<ToggleResponse>, AppError> {
    let outcome = toggle(&state.db.engagement, kind, target, actor).await?;
    let message = outcome.message(kind);
    let added = outcome.is_added();

    tracing::info!(engagement = %kind, target_id = %target, added, "Engagement toggled");

    Ok(ApiResponse::ok(
        ToggleResponse {
            added,
            record: outcome.into_record(),
        },
        message,
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/likes/toggle/v/{videoId}",
    tag = "likes",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Like added or removed", body = ApiResponse<ToggleResponse>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn toggle_video_like(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_id(&video_id, EngagementKind::VideoLike.target_label())?;
    if state.db.videos.find_visible(video_id, auth.id()).await?.is_none() {
        return Err(AppError::NotFound("Video not found".to_string()).into());
    }

    Ok(toggle_engagement(&state, EngagementKind::VideoLike, video_id, auth.id()).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/likes/toggle/c/{commentId}",
    tag = "likes",
    params(("commentId" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Like added or removed", body = ApiResponse<ToggleResponse>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn toggle_comment_like(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let comment_id = parse_id(&comment_id, EngagementKind::CommentLike.target_label())?;
    if state.db.comments.find_with_owner(comment_id).await?.is_none() {
        return Err(AppError::NotFound("Comment not found".to_string()).into());
    }

    Ok(toggle_engagement(&state, EngagementKind::CommentLike, comment_id, auth.id()).await?)
}

#[utoipa::path(
    post,
    path = "/api/v1/likes/toggle/t/{tweetId}",
    tag = "likes",
    params(("tweetId" = String, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Like added or removed", body = ApiResponse<ToggleResponse>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Tweet not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn toggle_tweet_like(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(tweet_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tweet_id = parse_id(&tweet_id, EngagementKind::TweetLike.target_label())?;
    if state.db.tweets.find_with_owner(tweet_id).await?.is_none() {
        return Err(AppError::NotFound("Tweet not found".to_string()).into());
    }

    Ok(toggle_engagement(&state, EngagementKind::TweetLike, tweet_id, auth.id()).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/likes/videos",
    tag = "likes",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Videos liked by the caller, most recent like first", body = ApiResponse<Page<LikedVideo>>)
    )
)]
#[tracing::instrument(skip(state, auth, pagination), fields(user_id = %auth.id()))]
pub async fn liked_videos(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state
        .db
        .engagement
        .liked_videos(auth.id(), Pagination::from(&pagination))
        .await?;

    Ok(ApiResponse::ok(page, "Liked video fetched successfully"))
}
