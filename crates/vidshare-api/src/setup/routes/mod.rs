//! Route configuration and setup.
//!
//! Domain route groups live in [domains](domains); health checks in [health](health).

mod domains;
mod health;

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::constants::{API_PREFIX, MEDIA_ROUTE};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vidshare_core::{Config, StorageBackend};

/// Multipart framing on top of the largest accepted file
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = AuthState {
        tokens: state.auth.tokens.clone(),
        user_repository: state.db.users.clone(),
    };

    let public_routes = public_routes(state.clone());
    let protected_routes = protected_routes(state.clone()).layer(
        axum::middleware::from_fn_with_state(Arc::new(auth_state), auth_middleware),
    );

    let mut app = public_routes.merge(protected_routes).nest(
        "/docs",
        utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
            .path("/docs")
            .into(),
    );

    if config.storage_backend() == StorageBackend::Local {
        let media_dir = &config.storage().local_storage_path;
        tracing::info!(path = %media_dir, route = MEDIA_ROUTE, "Serving local media files");
        app = app.nest_service(MEDIA_ROUTE, ServeDir::new(media_dir));
    }

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);
    tracing::info!(http_concurrency_limit, "HTTP concurrency limit layer enabled");

    let body_limit = config
        .max_video_size_bytes()
        .max(config.max_image_size_bytes())
        + MULTIPART_OVERHEAD_BYTES;

    let app = app
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        // Cookies ride along cross-origin only with explicit origins.
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
            ])
            .allow_credentials(true)
    };
    Ok(cors)
}

fn public_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::liveness_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        .route(
            &format!("{}/health", API_PREFIX),
            get(health::liveness_check),
        )
        .route(
            &format!("{}/users/register", API_PREFIX),
            post(handlers::users::register),
        )
        .route(
            &format!("{}/users/login", API_PREFIX),
            post(handlers::users::login),
        )
        .route(
            &format!("{}/users/refresh-token", API_PREFIX),
            post(handlers::users::refresh_token),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .with_state(state)
}

fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .merge(domains::user_routes(state.clone()))
        .merge(domains::video_routes(state.clone()))
        .merge(domains::comment_routes(state.clone()))
        .merge(domains::like_routes(state.clone()))
        .merge(domains::subscription_routes(state.clone()))
        .merge(domains::tweet_routes(state.clone()))
        .merge(domains::playlist_routes(state.clone()))
        .merge(domains::dashboard_routes(state.clone()))
        .with_state(state)
}
