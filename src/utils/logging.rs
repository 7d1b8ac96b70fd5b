use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;
use crate::error::AppError;

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init_tracing(settings: &LoggingSettings) -> Result<(), AppError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("comet_collateral_swap={}", settings.level)))
        .map_err(|e| AppError::ConfigError(format!("Invalid log level {}: {}", settings.level, e)))?;

    let result = if settings.json {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .compact()
            .try_init()
    };
    result.map_err(|e| AppError::InternalError(format!("Failed to initialize tracing: {}", e)))?;

    info!(level = %settings.level, json = settings.json, "Logging initialized");
    Ok(())
}
