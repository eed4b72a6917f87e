use crate::auth::jwt::TokenService;
use crate::auth::models::AuthUser;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use vidshare_core::AppError;
use vidshare_db::UserRepository;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
    pub user_repository: UserRepository,
}

/// Access token from the `accessToken` cookie, else from `Authorization: Bearer`.
pub(crate) fn access_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = access_token(request.headers()) else {
        return HttpAppError(AppError::Unauthorized("Unauthorized request".to_string()))
            .into_response();
    };

    let claims = match auth_state.tokens.verify_access(&token) {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    // The account must still exist; a token outliving its user is invalid.
    let user = match auth_state.user_repository.find_by_id(claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(user_id = %claims.sub, "Access token for unknown user");
            return HttpAppError(AppError::Unauthorized("Invalid access token".to_string()))
                .into_response();
        }
        Err(e) => return HttpAppError(e).into_response(),
    };

    request.extensions_mut().insert(AuthUser { user });

    next.run(request).await
}
