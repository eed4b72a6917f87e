use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::likes::{toggle_engagement, ToggleResponse};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use std::sync::Arc;
use vidshare_core::models::{Page, Pagination, PaginationQuery, SubscriptionEntry};
use vidshare_core::validation::parse_id;
use vidshare_core::{AppError, EngagementKind};

#[utoipa::path(
    post,
    path = "/api/v1/subscriptions/c/{channelId}",
    tag = "subscriptions",
    params(("channelId" = String, Path, description = "Channel (user) ID")),
    responses(
        (status = 200, description = "Subscribed or unsubscribed", body = ApiResponse<ToggleResponse>),
        (status = 400, description = "Malformed id or own channel", body = ErrorResponse),
        (status = 404, description = "Channel not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn toggle_subscription(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let channel_id = parse_id(&channel_id, EngagementKind::Subscription.target_label())?;
    if channel_id != auth.id() && state.db.users.find_by_id(channel_id).await?.is_none() {
        return Err(AppError::NotFound("Channel not found".to_string()).into());
    }

    Ok(toggle_engagement(&state, EngagementKind::Subscription, channel_id, auth.id()).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/c/{channelId}",
    tag = "subscriptions",
    params(("channelId" = String, Path, description = "Caller's own channel ID"), PaginationQuery),
    responses(
        (status = 200, description = "Subscribers of the caller's channel", body = ApiResponse<Page<SubscriptionEntry>>),
        (status = 403, description = "Another user's channel", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, pagination), fields(user_id = %auth.id()))]
pub async fn channel_subscribers(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(channel_id): Path<String>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let channel_id = parse_id(&channel_id, "channel")?;
    if channel_id != auth.id() {
        return Err(AppError::Forbidden(
            "You are not allowed to see other's subscriber".to_string(),
        )
        .into());
    }

    let page = state
        .db
        .engagement
        .subscribers(channel_id, Pagination::from(&pagination))
        .await?;

    Ok(ApiResponse::ok(page, "Subscriber list fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/subscriptions/u/{subscriberId}",
    tag = "subscriptions",
    params(("subscriberId" = String, Path, description = "Caller's own user ID"), PaginationQuery),
    responses(
        (status = 200, description = "Channels the caller subscribes to", body = ApiResponse<Page<SubscriptionEntry>>),
        (status = 403, description = "Another user's list", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, pagination), fields(user_id = %auth.id()))]
pub async fn subscribed_channels(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(subscriber_id): Path<String>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let subscriber_id = parse_id(&subscriber_id, "subscriber")?;
    if subscriber_id != auth.id() {
        return Err(AppError::Forbidden(
            "You are not allowed to view others subscription list".to_string(),
        )
        .into());
    }

    let page = state
        .db
        .engagement
        .subscribed_channels(subscriber_id, Pagination::from(&pagination))
        .await?;

    Ok(ApiResponse::ok(page, "Subscribed channels fetched successfully"))
}
