use std::fmt;

use crate::adapters::AdapterError;
use crate::config::ValidationError;
use crate::models::SwapValidationError;
use crate::risk::RiskError;

#[derive(Debug)]
pub enum AppError {
    ConfigError(String),
    RiskError(RiskError),
    BlockchainError(AdapterError),
    ValidationError(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::RiskError(err) => write!(f, "Risk calculation error: {}", err),
            AppError::BlockchainError(err) => write!(f, "Blockchain error: {}", err),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::RiskError(err) => Some(err),
            AppError::BlockchainError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<RiskError> for AppError {
    fn from(err: RiskError) -> Self {
        AppError::RiskError(err)
    }
}

impl From<AdapterError> for AppError {
    fn from(err: AdapterError) -> Self {
        AppError::BlockchainError(err)
    }
}

impl From<SwapValidationError> for AppError {
    fn from(err: SwapValidationError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization error: {}", err))
    }
}
