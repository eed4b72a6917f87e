use crate::auth::models::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;
use vidshare_core::models::{
    CreatePlaylistRequest, Page, Pagination, PaginationQuery, Playlist, PlaylistDetail,
    PlaylistSummary, UpdatePlaylistRequest,
};
use vidshare_core::validation::{optional_text, parse_id, require_text};
use vidshare_core::{guard_as, AppError};

const NAME_REQUIRED: &str = "Playlist name is required and must be a non-empty string.";
const NAME_TAKEN: &str = "You already have a playlist with this name.";

async fn ensure_name_free(
    state: &AppState,
    owner_id: Uuid,
    name: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    if state.db.playlists.name_taken(owner_id, name, except).await? {
        return Err(AppError::Conflict(NAME_TAKEN.to_string()));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/v1/playlist",
    tag = "playlists",
    request_body = CreatePlaylistRequest,
    responses(
        (status = 201, description = "Playlist created", body = ApiResponse<Playlist>),
        (status = 400, description = "Missing name", body = ErrorResponse),
        (status = 409, description = "Caller already has a playlist with this name", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, req), fields(user_id = %auth.id()))]
pub async fn create_playlist(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreatePlaylistRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let name = require_text(req.name.as_deref(), NAME_REQUIRED)?;
    let description = optional_text(req.description.as_deref()).unwrap_or_default();

    ensure_name_free(&state, auth.id(), &name, None).await?;

    let playlist = state
        .db
        .playlists
        .create(auth.id(), &name, &description)
        .await?;

    Ok(ApiResponse::created(playlist, "Playlist created successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/playlist/user/{userId}",
    tag = "playlists",
    params(("userId" = String, Path, description = "Owner ID"), PaginationQuery),
    responses(
        (status = 200, description = "The user's playlists with video counts", body = ApiResponse<Page<PlaylistSummary>>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, pagination), fields(user_id = %auth.id()))]
pub async fn user_playlists(
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
        .playlists
        .list_by_owner(owner_id, Pagination::from(&pagination))
        .await?;

    Ok(ApiResponse::ok(page, "Playlists fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/playlist/{playlistId}",
    tag = "playlists",
    params(("playlistId" = String, Path, description = "Playlist ID")),
    responses(
        (status = 200, description = "Playlist with owner and videos in order", body = ApiResponse<PlaylistDetail>),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Playlist not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn get_playlist(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(playlist_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_id(&playlist_id, "playlist")?;

    let detail = state
        .db
        .playlists
        .find_detail(id, auth.id())
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))?;

    Ok(ApiResponse::ok(detail, "Playlist fetched successfully"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/playlist/{playlistId}",
    tag = "playlists",
    params(("playlistId" = String, Path, description = "Playlist ID")),
    request_body = UpdatePlaylistRequest,
    responses(
        (status = 200, description = "Playlist updated", body = ApiResponse<Playlist>),
        (status = 400, description = "Nothing to update", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Playlist not found", body = ErrorResponse),
        (status = 409, description = "Name already used by another of the caller's playlists", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, req), fields(user_id = %auth.id()))]
pub async fn update_playlist(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(playlist_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdatePlaylistRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let playlist: Playlist = guard_as(&state.db.resources, &playlist_id, auth.id()).await?;

    let name = optional_text(req.name.as_deref());
    let description = req.description.as_deref().map(str::trim);

    if name.is_none() && description.is_none() {
        return Err(AppError::BadRequest(NAME_REQUIRED.to_string()).into());
    }

    if let Some(name) = name.as_deref() {
        ensure_name_free(&state, auth.id(), name, Some(playlist.id)).await?;
    }

    let updated = state
        .db
        .playlists
        .update(playlist.id, name.as_deref(), description)
        .await?;

    Ok(ApiResponse::ok(updated, "Playlist updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/playlist/{playlistId}",
    tag = "playlists",
    params(("playlistId" = String, Path, description = "Playlist ID")),
    responses(
        (status = 200, description = "Playlist deleted; its videos are untouched", body = ApiResponse<Playlist>),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Playlist not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn delete_playlist(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(playlist_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let playlist: Playlist = guard_as(&state.db.resources, &playlist_id, auth.id()).await?;

    if !state.db.playlists.delete(playlist.id).await? {
        return Err(AppError::NotFound("Playlist not found".to_string()).into());
    }

    Ok(ApiResponse::ok(playlist, "Playlist deleted successfully"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/playlist/add/{videoId}/{playlistId}",
    tag = "playlists",
    params(
        ("videoId" = String, Path, description = "Video ID"),
        ("playlistId" = String, Path, description = "Playlist ID")
    ),
    responses(
        (status = 200, description = "Video is in the playlist", body = ApiResponse<PlaylistDetail>),
        (status = 403, description = "Not the playlist owner", body = ErrorResponse),
        (status = 404, description = "Playlist or video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn add_video_to_playlist(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let playlist: Playlist = guard_as(&state.db.resources, &playlist_id, auth.id()).await?;
    let video_id = parse_id(&video_id, "video")?;

    if state.db.videos.find_visible(video_id, auth.id()).await?.is_none() {
        return Err(AppError::NotFound("Video not found".to_string()).into());
    }

    if !state.db.playlists.add_video(playlist.id, video_id).await? {
        tracing::debug!(playlist_id = %playlist.id, video_id = %video_id, "Video already in playlist");
    }

    let detail = state
        .db
        .playlists
        .find_detail(playlist.id, auth.id())
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))?;

    Ok(ApiResponse::ok(detail, "Video added to playlist successfully"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/playlist/remove/{videoId}/{playlistId}",
    tag = "playlists",
    params(
        ("videoId" = String, Path, description = "Video ID"),
        ("playlistId" = String, Path, description = "Playlist ID")
    ),
    responses(
        (status = 200, description = "Video removed", body = ApiResponse<PlaylistDetail>),
        (status = 400, description = "Video is not in the playlist", body = ErrorResponse),
        (status = 403, description = "Not the playlist owner", body = ErrorResponse),
        (status = 404, description = "Playlist not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn remove_video_from_playlist(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let playlist: Playlist = guard_as(&state.db.resources, &playlist_id, auth.id()).await?;
    let video_id = parse_id(&video_id, "video")?;

    if !state.db.playlists.remove_video(playlist.id, video_id).await? {
        return Err(AppError::BadRequest("Video is not in the playlist".to_string()).into());
    }

    let detail = state
        .db
        .playlists
        .find_detail(playlist.id, auth.id())
        .await?
        .ok_or_else(|| AppError::NotFound("Playlist not found".to_string()))?;

    Ok(ApiResponse::ok(detail, "Video removed from playlist successfully"))
}
