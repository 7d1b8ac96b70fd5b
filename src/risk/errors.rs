// Risk engine input contract violations
use alloy::primitives::Address;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Invalid scale: {scale} (scale must be positive)")]
    InvalidScale { scale: u64 },

    #[error("Invalid factor scale: {factor_scale} (factor scale must be positive)")]
    InvalidFactorScale { factor_scale: u64 },

    #[error("Invalid price for asset {asset}: {price}")]
    InvalidPrice { asset: Address, price: f64 },

    #[error("Invalid {field} for asset {asset}: {value} exceeds factor scale {factor_scale}")]
    InvalidFactor {
        asset: Address,
        field: &'static str,
        value: u64,
        factor_scale: u64,
    },

    #[error("Non-finite {quantity}: {value}")]
    NonFinite { quantity: &'static str, value: f64 },

    #[error("Fixed-point conversion failed: {message}")]
    ConversionError { message: String },
}

impl From<bigdecimal::ParseBigDecimalError> for RiskError {
    fn from(err: bigdecimal::ParseBigDecimalError) -> Self {
        RiskError::ConversionError {
            message: err.to_string(),
        }
    }
}
