use thiserror::Error;
use url::Url;

use crate::config::Settings;
use crate::models::validate_slippage;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid range: {field} must be between {min} and {max}, got {value}")]
    InvalidRange { field: String, min: f64, max: f64, value: f64 },
    #[error("Invalid format: {field} - {message}")]
    InvalidFormat { field: String, message: String },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

const TIMEOUT_RANGE_SECONDS: (u64, u64) = (1, 300);

impl Settings {
    pub fn validate(&self) -> ValidationResult<()> {
        let url = Url::parse(&self.rpc.url)
            .map_err(|e| ValidationError::InvalidUrl(format!("{}: {}", self.rpc.url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::InvalidUrl(format!(
                "{}: unsupported scheme {}",
                self.rpc.url,
                url.scheme()
            )));
        }

        let (min, max) = TIMEOUT_RANGE_SECONDS;
        let timeout = self.rpc.request_timeout_seconds;
        if timeout < min || timeout > max {
            return Err(ValidationError::InvalidRange {
                field: "rpc.request_timeout_seconds".to_string(),
                min: min as f64,
                max: max as f64,
                value: timeout as f64,
            });
        }

        validate_slippage(self.swap.default_slippage_pct).map_err(|e| {
            ValidationError::InvalidFormat {
                field: "swap.default_slippage_pct".to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(())
    }
}
