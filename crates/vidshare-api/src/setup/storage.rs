//! Media store setup

use anyhow::Result;
use std::sync::Arc;
use vidshare_core::Config;
use vidshare_storage::{create_storage, Storage};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing media store...");
    let storage = create_storage(config).await?;
    tracing::info!(
        backend = ?storage.backend_type(),
        "Media store initialized successfully"
    );
    Ok(storage)
}
