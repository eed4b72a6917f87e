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
    AddCommentRequest, Comment, CommentWithOwner, Page, Pagination, PaginationQuery,
    UpdateCommentRequest,
};
use vidshare_core::validation::{parse_id, require_text};
use vidshare_core::{guard_as, AppError};

#[utoipa::path(
    get,
    path = "/api/v1/comments/{videoId}",
    tag = "comments",
    params(("videoId" = String, Path, description = "Video ID"), PaginationQuery),
    responses(
        (status = 200, description = "Newest-first page of comments", body = ApiResponse<Page<CommentWithOwner>>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, pagination), fields(user_id = %auth.id()))]
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_id(&video_id, "video")?;
    if state.db.videos.find_visible(video_id, auth.id()).await?.is_none() {
        return Err(AppError::NotFound("Video not found".to_string()).into());
    }

    let page = state
        .db
        .comments
        .list_for_video(video_id, Pagination::from(&pagination))
        .await?;

    Ok(ApiResponse::ok(page, "Comments fetched successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/comments/{videoId}",
    tag = "comments",
    params(("videoId" = String, Path, description = "Video ID")),
    request_body = AddCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = ApiResponse<CommentWithOwner>),
        (status = 400, description = "Empty comment or malformed id", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, req), fields(user_id = %auth.id()))]
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
    ValidatedJson(req): ValidatedJson<AddCommentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_id(&video_id, "video")?;
    let content = require_text(req.content.as_deref(), "Comment can't be empty")?;

    if state.db.videos.find_visible(video_id, auth.id()).await?.is_none() {
        return Err(AppError::NotFound("Video not found".to_string()).into());
    }

    let comment = state.db.comments.create(video_id, auth.id(), &content).await?;

    Ok(ApiResponse::created(
        CommentWithOwner {
            comment,
            owner: auth.user.summary(),
        },
        "Comment added successfully",
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/comments/c/{commentId}",
    tag = "comments",
    params(("commentId" = String, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated, with its author", body = ApiResponse<CommentWithOwner>),
        (status = 400, description = "Empty or unchanged content", body = ErrorResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, req), fields(user_id = %auth.id()))]
pub async fn update_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(comment_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateCommentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let comment: Comment = guard_as(&state.db.resources, &comment_id, auth.id()).await?;
    let content = require_text(req.new_content.as_deref(), "Comment can't be empty")?;

    if content == comment.content {
        return Err(AppError::BadRequest(
            "newComment should be different from previous one".to_string(),
        )
        .into());
    }

    let updated = state.db.comments.update_content(comment.id, &content).await?;

    Ok(ApiResponse::ok(
        CommentWithOwner {
            comment: updated,
            owner: auth.user.summary(),
        },
        "Comment updated successfully",
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/comments/c/{commentId}",
    tag = "comments",
    params(("commentId" = String, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = ApiResponse<Comment>),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Comment not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let comment: Comment = guard_as(&state.db.resources, &comment_id, auth.id()).await?;

    if !state.db.comments.delete(comment.id).await? {
        return Err(AppError::NotFound("Comment not found".to_string()).into());
    }

    Ok(ApiResponse::ok(comment, "Comment deleted successfully"))
}
