//! Application setup and initialization
//!
//! Everything `main` needs to turn a `Config` into a running router, split so tests can
//! build the same router around their own pool and media store.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::auth::jwt::TokenService;
use crate::state::{AppState, AuthConfigState, DbState, MediaConfig};
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use vidshare_core::Config;
use vidshare_storage::Storage;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    validation::validate_config(&config).context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let state = build_state(&config, pool, storage);
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

/// Assemble the shared state from already-initialized infrastructure.
pub fn build_state(config: &Config, pool: PgPool, storage: Arc<dyn Storage>) -> Arc<AppState> {
    Arc::new(AppState {
        db: DbState::new(pool),
        media: MediaConfig::from_config(config, storage),
        auth: AuthConfigState {
            tokens: Arc::new(TokenService::new(config.auth())),
            secure_cookies: config.is_production(),
        },
    })
}
