//! Account, session and channel-profile handlers

use crate::auth::jwt::TokenPair;
use crate::auth::middleware::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::auth::models::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::{ApiResponse, Empty};
use crate::state::AppState;
use crate::utils::upload::{discard_media, read_multipart, FileRule};
use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use vidshare_core::models::{
    AuthResponse, ChangePasswordRequest, ChannelProfile, LoginRequest, NewUser, Page,
    Pagination, PaginationQuery, RefreshTokenRequest, UpdateAccountRequest, UserResponse,
    WatchHistoryEntry,
};
use vidshare_core::validation::{optional_text, validate_email, validate_username};
use vidshare_core::AppError;
use vidshare_storage::MediaKind;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

fn auth_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

fn with_session(jar: CookieJar, tokens: &TokenPair, secure: bool) -> CookieJar {
    jar.add(auth_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        secure,
    ))
    .add(auth_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token.clone(),
        secure,
    ))
}

fn without_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"))
}

/// Issue a fresh token pair and make its refresh token the only valid one for the user.
async fn start_session(
    state: &AppState,
    user: vidshare_core::models::User,
) -> Result<(TokenPair, AuthResponse), AppError> {
    let tokens = state.auth.tokens.issue_pair(&user)?;
    state
        .db
        .users
        .set_refresh_token(user.id, Some(&tokens.refresh_token))
        .await?;

    let response = AuthResponse {
        user: UserResponse::from(user),
        access_token: tokens.access_token.clone(),
        refresh_token: tokens.refresh_token.clone(),
    };
    Ok((tokens, response))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    tag = "users",
    request_body(content_type = "multipart/form-data", description = "fullName, email, username, password, avatar (file), coverImage (optional file)"),
    responses(
        (status = 201, description = "User registered", body = ApiResponse<UserResponse>),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 409, description = "Username or email taken", body = ErrorResponse),
        (status = 413, description = "Image too large", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "register_user"))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let media = &state.media;
    let mut form = read_multipart(
        multipart,
        &[
            FileRule::new("avatar", MediaKind::Avatar, media.image_max_file_size),
            FileRule::new("coverImage", MediaKind::Cover, media.image_max_file_size),
        ],
        media.temp_dir.as_deref(),
    )
    .await?;

    let (Some(full_name), Some(email), Some(username), Some(password)) = (
        form.text("fullName").map(str::to_string),
        form.text("email").map(str::to_string),
        form.text("username").map(str::to_string),
        form.raw("password").map(str::to_string),
    ) else {
        return Err(AppError::BadRequest("Please fill all the required fields".to_string()).into());
    };

    let username = validate_username(&username)?;
    let email = validate_email(&email)?;
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&password.len()) {
        return Err(AppError::BadRequest(format!(
            "Password must be between {} and {} characters",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        ))
        .into());
    }

    if state.db.users.exists(&username, &email).await? {
        return Err(AppError::Conflict("User with email or username already exist".to_string()).into());
    }

    let avatar = form
        .take_file("avatar")
        .ok_or_else(|| AppError::BadRequest("Avatar file is required".to_string()))?;
    let cover = form.take_file("coverImage");

    let avatar = avatar.upload_to(media.storage.as_ref()).await?;
    let cover = match cover {
        Some(file) => match file.upload_to(media.storage.as_ref()).await {
            Ok(asset) => Some(asset),
            Err(e) => {
                discard_media(media.storage.as_ref(), &avatar.url).await;
                return Err(e.into());
            }
        },
        None => None,
    };
    let cover_url = cover.map(|asset| asset.url).unwrap_or_default();

    let password_hash = hash_password(&password)?;
    let created = state
        .db
        .users
        .create(NewUser {
            username,
            email,
            full_name,
            password_hash,
            avatar: avatar.url.clone(),
            cover_image: cover_url.clone(),
        })
        .await;

    let user = match created {
        Ok(user) => user,
        Err(e) => {
            discard_media(media.storage.as_ref(), &avatar.url).await;
            discard_media(media.storage.as_ref(), &cover_url).await;
            return Err(e.into());
        }
    };

    tracing::info!(user_id = %user.id, "User registered");

    Ok(ApiResponse::created(
        UserResponse::from(user),
        "User registered successfully.",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; tokens also set as cookies", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Neither username nor email given", body = ErrorResponse),
        (status = 401, description = "Wrong password", body = ErrorResponse),
        (status = 404, description = "Unknown user", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, jar, req), fields(operation = "login"))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let email = optional_text(req.email.as_deref()).map(|e| e.to_lowercase());
    let username = optional_text(req.username.as_deref()).map(|u| u.to_lowercase());
    if email.is_none() && username.is_none() {
        return Err(AppError::BadRequest("username or email is required".to_string()).into());
    }

    let user = state
        .db
        .users
        .find_by_login(email.as_deref(), username.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("User does not exist".to_string()))?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid user credentials".to_string()).into());
    }

    let (tokens, response) = start_session(&state, user).await?;
    let jar = with_session(jar, &tokens, state.auth.secure_cookies);

    Ok((jar, ApiResponse::ok(response, "User logged in successfully")))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    tag = "users",
    responses(
        (status = 200, description = "Logged out; cookies cleared", body = ApiResponse<Empty>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, jar), fields(user_id = %auth.id()))]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, HttpAppError> {
    state.db.users.set_refresh_token(auth.id(), None).await?;

    Ok((
        without_session(jar),
        ApiResponse::ok(Empty::default(), "User logged out successfully"),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/refresh-token",
    tag = "users",
    request_body(content = RefreshTokenRequest, description = "Optional when the refreshToken cookie is sent"),
    responses(
        (status = 200, description = "Tokens rotated", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Missing, invalid or already used refresh token", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, jar, body), fields(operation = "refresh_token"))]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let from_body = if body.is_empty() {
        RefreshTokenRequest::default()
    } else {
        serde_json::from_slice::<RefreshTokenRequest>(&body).map_err(AppError::from)?
    };

    let incoming = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| optional_text(from_body.refresh_token.as_deref()))
        .ok_or_else(|| AppError::Unauthorized("Unauthorized request".to_string()))?;

    let claims = state.auth.tokens.verify_refresh(&incoming)?;
    let user = state
        .db
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    // Each refresh token is single-use: only the most recently issued one is accepted.
    if user.refresh_token.as_deref() != Some(incoming.as_str()) {
        return Err(AppError::Unauthorized("Refresh token is expired or used".to_string()).into());
    }

    let (tokens, response) = start_session(&state, user).await?;
    let jar = with_session(jar, &tokens, state.auth.secure_cookies);

    Ok((jar, ApiResponse::ok(response, "Access token refreshed")))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/current-user",
    tag = "users",
    responses(
        (status = 200, description = "The authenticated user", body = ApiResponse<UserResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn current_user(auth: AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(
        UserResponse::from(auth.user),
        "Current user fetched successfully",
    )
}

#[utoipa::path(
    post,
    path = "/api/v1/users/change-password",
    tag = "users",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<Empty>),
        (status = 400, description = "Old password wrong or new password invalid", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, req), fields(user_id = %auth.id()))]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !verify_password(&req.old_password, &auth.user.password_hash)? {
        return Err(AppError::BadRequest("Invalid old password".to_string()).into());
    }

    let password_hash = hash_password(&req.new_password)?;
    state
        .db
        .users
        .update_password(auth.id(), &password_hash)
        .await?;

    Ok(ApiResponse::ok(Empty::default(), "Password changed successfully"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/update-account",
    tag = "users",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "No field given or invalid email", body = ErrorResponse),
        (status = 409, description = "Email taken", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, req), fields(user_id = %auth.id()))]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateAccountRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let full_name = optional_text(req.full_name.as_deref());
    let email = optional_text(req.email.as_deref())
        .map(|e| validate_email(&e))
        .transpose()?;

    if full_name.is_none() && email.is_none() {
        return Err(AppError::BadRequest("fullName or email is required".to_string()).into());
    }

    let user = state
        .db
        .users
        .update_account(auth.id(), full_name.as_deref(), email.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        UserResponse::from(user),
        "Account details updated successfully",
    ))
}

#[derive(Debug, Clone, Copy)]
enum ProfileImage {
    Avatar,
    Cover,
}

impl ProfileImage {
    fn rule(&self, max_size: usize) -> FileRule {
        match self {
            ProfileImage::Avatar => FileRule::new("avatar", MediaKind::Avatar, max_size),
            ProfileImage::Cover => FileRule::new("coverImage", MediaKind::Cover, max_size),
        }
    }
}

/// Replace the avatar or cover image. The old asset is deleted only once the new one is stored.
async fn replace_profile_image(
    state: &AppState,
    auth: AuthUser,
    multipart: Multipart,
    image: ProfileImage,
) -> Result<UserResponse, HttpAppError> {
    let media = &state.media;
    let rule = image.rule(media.image_max_file_size);
    let mut form = read_multipart(multipart, &[rule], media.temp_dir.as_deref()).await?;

    let file = form.take_file(rule.field).ok_or_else(|| {
        AppError::BadRequest(match image {
            ProfileImage::Avatar => "Avatar file is missing".to_string(),
            ProfileImage::Cover => "Cover image file is missing".to_string(),
        })
    })?;

    let asset = file.upload_to(media.storage.as_ref()).await?;

    let (updated, previous) = match image {
        ProfileImage::Avatar => (
            state.db.users.update_avatar(auth.id(), &asset.url).await,
            auth.user.avatar,
        ),
        ProfileImage::Cover => (
            state.db.users.update_cover_image(auth.id(), &asset.url).await,
            auth.user.cover_image,
        ),
    };

    let user = match updated {
        Ok(user) => user,
        Err(e) => {
            discard_media(media.storage.as_ref(), &asset.url).await;
            return Err(e.into());
        }
    };

    discard_media(media.storage.as_ref(), &previous).await;

    Ok(UserResponse::from(user))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/avatar",
    tag = "users",
    request_body(content_type = "multipart/form-data", description = "avatar (file)"),
    responses(
        (status = 200, description = "Avatar replaced", body = ApiResponse<UserResponse>),
        (status = 400, description = "No avatar file", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, multipart), fields(user_id = %auth.id()))]
pub async fn update_avatar(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = replace_profile_image(&state, auth, multipart, ProfileImage::Avatar).await?;
    Ok(ApiResponse::ok(user, "Avatar image updated successfully"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/cover-image",
    tag = "users",
    request_body(content_type = "multipart/form-data", description = "coverImage (file)"),
    responses(
        (status = 200, description = "Cover image replaced", body = ApiResponse<UserResponse>),
        (status = 400, description = "No cover image file", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth, multipart), fields(user_id = %auth.id()))]
pub async fn update_cover_image(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = replace_profile_image(&state, auth, multipart, ProfileImage::Cover).await?;
    Ok(ApiResponse::ok(user, "Cover image updated successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/c/{username}",
    tag = "users",
    params(("username" = String, Path, description = "Channel username")),
    responses(
        (status = 200, description = "Channel profile", body = ApiResponse<ChannelProfile>),
        (status = 404, description = "Channel does not exist", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, auth), fields(user_id = %auth.id()))]
pub async fn channel_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let username = username.trim().to_lowercase();
    if username.is_empty() {
        return Err(AppError::BadRequest("username is missing".to_string()).into());
    }

    let profile = state
        .db
        .users
        .channel_profile(&username, auth.id())
        .await?
        .ok_or_else(|| AppError::NotFound("Channel does not exist".to_string()))?;

    Ok(ApiResponse::ok(profile, "User channel fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/history",
    tag = "users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Watch history, most recent first", body = ApiResponse<Page<WatchHistoryEntry>>)
    )
)]
#[tracing::instrument(skip(state, auth, query), fields(user_id = %auth.id()))]
pub async fn watch_history(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state
        .db
        .users
        .watch_history(auth.id(), Pagination::from(&query))
        .await?;

    Ok(ApiResponse::ok(page, "Watch history fetched successfully"))
}
