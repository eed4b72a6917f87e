use crate::auth::models::AuthUser;
use crate::error::HttpAppError;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use std::sync::Arc;
use vidshare_core::models::{
    ChannelStats, Page, Pagination, PaginationQuery, VideoFilter, VideoWithOwner,
};

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Aggregates over the caller's channel", body = ApiResponse<ChannelStats>)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn channel_stats(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, HttpAppError> {
    let stats = state.db.dashboard.channel_stats(auth.id()).await?;

    Ok(ApiResponse::ok(stats, "Channel stats fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/videos",
    tag = "dashboard",
    params(PaginationQuery),
    responses(
        (status = 200, description = "The caller's videos, unpublished included", body = ApiResponse<Page<VideoWithOwner>>)
    )
)]
#[tracing::instrument(skip(state, auth, pagination), fields(user_id = %auth.id()))]
pub async fn channel_videos(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let filter = VideoFilter {
        owner_id: Some(auth.id()),
        viewer_id: Some(auth.id()),
        ..VideoFilter::default()
    };

    let page = state
        .db
        .videos
        .list(&filter, Pagination::from(&pagination))
        .await?;

    Ok(ApiResponse::ok(page, "Channel videos fetched successfully"))
}
