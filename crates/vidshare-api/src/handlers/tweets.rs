use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use std::sync::Arc;
use vidshare_core::models::{
    CreateTweetRequest, Page, Pagination, PaginationQuery, Tweet, TweetWithOwner,
    UpdateTweetRequest,
};
use vidshare_core::validation::{parse_id, require_text};
use vidshare_core::{guard_as, AppError};

#[utoipa::path(
    post,
    path = "/api/v1/tweets",
    tag = "tweets",
    request_body = CreateTweetRequest,
    responses(
        (status = 201, description = "Tweet created", body = ApiResponse<TweetWithOwner>),
        (status = 400, description = "Empty content", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, req), fields(user_id = %auth.id()))]
pub async fn create_tweet(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateTweetRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let content = require_text(req.content.as_deref(), "Content required")?;

    let tweet = state.db.tweets.create(auth.id(), &content).await?;

    Ok(ApiResponse::created(
        TweetWithOwner {
            tweet,
            owner: auth.user.summary(),
            likes_count: 0,
        },
        "Tweet created successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/tweets/user/{userId}",
    tag = "tweets",
    params(("userId" = String, Path, description = "Author ID"), PaginationQuery),
    responses(
        (status = 200, description = "Newest-first page of the user's tweets", body = ApiResponse<Page<TweetWithOwner>>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, pagination), fields(user_id = %auth.id()))]
pub async fn user_tweets(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let owner_id = parse_id(&user_id, "user")?;
    if state.db.users.find_by_id(owner_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()).into());
    }

    let page = state
        .db
        .tweets
        .list_by_owner(owner_id, Pagination::from(&pagination))
        .await?;

    Ok(ApiResponse::ok(page, "User tweets fetched successfully"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/tweets/{tweetId}",
    tag = "tweets",
    params(("tweetId" = String, Path, description = "Tweet ID")),
    request_body = UpdateTweetRequest,
    responses(
        (status = 200, description = "Tweet updated, with its author and like count", body = ApiResponse<TweetWithOwner>),
        (status = 400, description = "Empty or unchanged content", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Tweet not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, req), fields(user_id = %auth.id()))]
pub async fn update_tweet(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(tweet_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateTweetRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tweet: Tweet = guard_as(&state.db.resources, &tweet_id, auth.id()).await?;
    let content = require_text(req.new_content.as_deref(), "newContent is required")?;

    if content == tweet.content {
        return Err(AppError::BadRequest(
            "New content is identical to existing content".to_string(),
        )
        .into());
    }

    state.db.tweets.update_content(tweet.id, &content).await?;

    let updated = state
        .db
        .tweets
        .find_with_owner(tweet.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tweet not found".to_string()))?;

    Ok(ApiResponse::ok(updated, "Tweet updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tweets/{tweetId}",
    tag = "tweets",
    params(("tweetId" = String, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "Tweet deleted", body = ApiResponse<Tweet>),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Tweet not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn delete_tweet(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(tweet_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tweet: Tweet = guard_as(&state.db.resources, &tweet_id, auth.id()).await?;

    if !state.db.tweets.delete(tweet.id).await? {
        return Err(AppError::NotFound("Tweet not found".to_string()).into());
    }

    Ok(ApiResponse::ok(tweet, "Tweet deleted successfully"))
}
