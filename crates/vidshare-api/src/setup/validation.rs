//! Startup checks on top of `Config::validate`
//!
//! `Config::validate` rejects values that can never work; this adds the checks that depend on
//! the machine the server starts on.

use anyhow::Result;
use vidshare_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if let Some(dir) = config.upload_temp_dir() {
        if !dir.is_dir() {
            return Err(anyhow::anyhow!(
                "UPLOAD_TEMP_DIR '{}' does not exist or is not a directory",
                dir.display()
            ));
        }
    }

    if config.is_production() && config.cors_origins().is_empty() {
        tracing::warn!("No CORS origins configured - browsers will be unable to call the API");
    }

    if !config.is_production() {
        tracing::warn!(
            environment = %config.environment(),
            "Auth cookies are issued without the Secure attribute outside production"
        );
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}
