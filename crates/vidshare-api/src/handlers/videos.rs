use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::utils::upload::{discard_media, read_multipart, FileRule};
use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
};
use std::sync::Arc;
use vidshare_core::models::{
    NewVideo, Page, Pagination, SortDirection, Video, VideoChanges, VideoDetail, VideoFilter,
    VideoListQuery, VideoSortField, VideoWithOwner,
};
use vidshare_core::validation::{optional_text, parse_id};
use vidshare_core::{guard_as, AppError};
use vidshare_storage::MediaKind;

#[utoipa::path(
    get,
    path = "/api/v1/videos",
    tag = "videos",
    params(VideoListQuery),
    responses(
        (status = 200, description = "Page of videos with their owners", body = ApiResponse<Page<VideoWithOwner>>),
        (status = 400, description = "Malformed userId", body = ErrorResponse),
        (status = 404, description = "userId does not exist", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, auth, query),
    fields(user_id = %auth.id(), search = ?query.query, sort_by = ?query.sort_by, operation = "list_videos")
)]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<VideoListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let pagination = Pagination::from_raw(query.page.as_deref(), query.limit.as_deref());

    let owner_id = match optional_text(query.user_id.as_deref()) {
        Some(raw) => {
            let owner_id = parse_id(&raw, "user")?;
            if state.db.users.find_by_id(owner_id).await?.is_none() {
                return Err(AppError::NotFound("User not found".to_string()).into());
            }
            Some(owner_id)
        }
        None => None,
    };

    let filter = VideoFilter {
        search: optional_text(query.query.as_deref()),
        owner_id,
        viewer_id: Some(auth.id()),
        sort: query
            .sort_by
            .as_deref()
            .and_then(VideoSortField::parse)
            .unwrap_or_default(),
        direction: query
            .sort_type
            .as_deref()
            .map(SortDirection::parse)
            .unwrap_or_default(),
    };

    let page = state.db.videos.list(&filter, pagination).await?;

    Ok(ApiResponse::ok(page, "Videos fetched successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/videos",
    tag = "videos",
    request_body(content_type = "multipart/form-data", description = "title, description, videoFile (or video) and thumbnail files"),
    responses(
        (status = 201, description = "Video published", body = ApiResponse<VideoWithOwner>),
        (status = 400, description = "Missing field or file", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Media upload failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, multipart), fields(user_id = %auth.id(), operation = "publish_video"))]
pub async fn publish_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let media = &state.media;
    let mut form = read_multipart(
        multipart,
        &[
            FileRule::new("videoFile", MediaKind::Video, media.video_max_file_size),
            FileRule::new("video", MediaKind::Video, media.video_max_file_size),
            FileRule::new("thumbnail", MediaKind::Thumbnail, media.image_max_file_size),
        ],
        media.temp_dir.as_deref(),
    )
    .await?;

    let (Some(title), Some(description)) = (
        form.text("title").map(str::to_string),
        form.text("description").map(str::to_string),
    ) else {
        return Err(AppError::BadRequest("Title and description are required".to_string()).into());
    };

    let video_file = form.take_file("videoFile").or_else(|| form.take_file("video"));
    let (Some(video_file), Some(thumbnail)) = (video_file, form.take_file("thumbnail")) else {
        return Err(AppError::BadRequest(
            "video file and thumbnail, both are required".to_string(),
        )
        .into());
    };

    // Video first, then thumbnail; a failed thumbnail removes the stored video.
    let video_asset = video_file.upload_to(media.storage.as_ref()).await?;
    let thumbnail_asset = match thumbnail.upload_to(media.storage.as_ref()).await {
        Ok(asset) => asset,
        Err(e) => {
            discard_media(media.storage.as_ref(), &video_asset.url).await;
            return Err(e.into());
        }
    };

    let created = state
        .db
        .videos
        .create(NewVideo {
            owner_id: auth.id(),
            title,
            description,
            video_file: video_asset.url.clone(),
            thumbnail: thumbnail_asset.url.clone(),
            duration: video_asset.duration.unwrap_or(0.0),
        })
        .await;

    let video = match created {
        Ok(video) => video,
        Err(e) => {
            discard_media(media.storage.as_ref(), &video_asset.url).await;
            discard_media(media.storage.as_ref(), &thumbnail_asset.url).await;
            return Err(e.into());
        }
    };

    tracing::info!(video_id = %video.id, duration = video.duration, "Video published");

    Ok(ApiResponse::created(
        VideoWithOwner {
            video,
            owner: auth.user.summary(),
        },
        "Video published successfully",
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{videoId}",
    tag = "videos",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video with likesCount and subCount; counts one view", body = ApiResponse<VideoDetail>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id(), operation = "get_video"))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_id(&video_id, "video")?;

    let detail = state
        .db
        .videos
        .view(id, auth.id())
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    state.db.users.record_watch(auth.id(), id).await?;

    Ok(ApiResponse::ok(detail, "Video fetched successfully"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/videos/{videoId}",
    tag = "videos",
    params(("videoId" = String, Path, description = "Video ID")),
    request_body(content_type = "multipart/form-data", description = "Any of title, description, thumbnail (file)"),
    responses(
        (status = 200, description = "Video updated", body = ApiResponse<VideoWithOwner>),
        (status = 400, description = "Malformed id or nothing to update", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, multipart), fields(user_id = %auth.id(), operation = "update_video"))]
pub async fn update_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let video: Video = guard_as(&state.db.resources, &video_id, auth.id()).await?;

    let media = &state.media;
    let mut form = read_multipart(
        multipart,
        &[FileRule::new("thumbnail", MediaKind::Thumbnail, media.image_max_file_size)],
        media.temp_dir.as_deref(),
    )
    .await?;

    let mut changes = VideoChanges {
        title: form.text("title").map(str::to_string),
        description: form.text("description").map(str::to_string),
        thumbnail: None,
    };
    let thumbnail = form.take_file("thumbnail");

    if changes.is_empty() && thumbnail.is_none() {
        return Err(AppError::BadRequest(
            "Provide a title, description or thumbnail to update".to_string(),
        )
        .into());
    }

    changes = changes.discard_unchanged(&video);
    if changes.is_empty() && thumbnail.is_none() {
        return Err(AppError::BadRequest(
            "New title and description are identical to the current ones".to_string(),
        )
        .into());
    }

    let new_thumbnail = match thumbnail {
        Some(file) => Some(file.upload_to(media.storage.as_ref()).await?),
        None => None,
    };
    changes.thumbnail = new_thumbnail.as_ref().map(|asset| asset.url.clone());

    let updated = match state.db.videos.update(video.id, &changes).await {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(asset) = &new_thumbnail {
                discard_media(media.storage.as_ref(), &asset.url).await;
            }
            return Err(e.into());
        }
    };

    if new_thumbnail.is_some() {
        discard_media(media.storage.as_ref(), &video.thumbnail).await;
    }

    Ok(ApiResponse::ok(
        VideoWithOwner {
            video: updated,
            owner: auth.user.summary(),
        },
        "Video updated successfully",
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/videos/{videoId}",
    tag = "videos",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video and its media deleted", body = ApiResponse<Video>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id(), operation = "delete_video"))]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video: Video = guard_as(&state.db.resources, &video_id, auth.id()).await?;

    if !state.db.videos.delete(video.id).await? {
        return Err(AppError::NotFound("Video not found".to_string()).into());
    }

    let storage = state.media.storage.as_ref();
    discard_media(storage, &video.video_file).await;
    discard_media(storage, &video.thumbnail).await;

    tracing::info!(video_id = %video.id, "Video deleted");

    Ok(ApiResponse::ok(video, "Video deleted successfully"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/videos/toggle/publish/{videoId}",
    tag = "videos",
    params(("videoId" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Publish flag flipped", body = ApiResponse<Video>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id(), operation = "toggle_publish"))]
pub async fn toggle_publish(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video: Video = guard_as(&state.db.resources, &video_id, auth.id()).await?;

    let video = state.db.videos.toggle_publish(video.id).await?;
    let message = if video.is_published {
        "Video published successfully"
    } else {
        "Video unpublished successfully"
    };

    Ok(ApiResponse::ok(video, message))
}
