// Fixed-point conversion between Comet's native integer units and real values
use alloy::primitives::U256;
use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use std::str::FromStr;

use crate::risk::RiskError;

/// Decimals of the market's base asset (USDC).
pub const BASE_DECIMALS: u32 = 6;
/// Units per whole base token.
pub const BASE_SCALE: u64 = 10u64.pow(BASE_DECIMALS);
/// Decimals of prices returned by `getPrice`.
pub const PRICE_DECIMALS: u32 = 8;
/// Units per whole USD in a raw price.
pub const PRICE_SCALE: u64 = 10u64.pow(PRICE_DECIMALS);

/// Convert a raw on-chain amount into a real quantity: `raw / scale`.
///
/// The division is carried out in arbitrary precision and only the final
/// quotient is narrowed to `f64`, so amounts far beyond 2^53 raw units keep
/// their fractional digits.
pub fn to_real(raw: U256, scale: u64) -> Result<f64, RiskError> {
    if scale == 0 {
        return Err(RiskError::InvalidScale { scale });
    }
    if raw.is_zero() {
        return Ok(0.0);
    }

    let amount = BigDecimal::from_str(&raw.to_string())?;
    let quotient = amount / BigDecimal::from(scale);

    quotient.to_f64().ok_or_else(|| RiskError::ConversionError {
        message: format!("{} / {} is not representable as f64", raw, scale),
    })
}

/// Convert a raw base-asset amount (always 6 decimals) into USD.
pub fn base_to_real(raw: U256) -> Result<f64, RiskError> {
    to_real(raw, BASE_SCALE)
}

/// Convert a raw 8-decimal Comet price into USD.
pub fn price_to_real(raw: U256) -> Result<f64, RiskError> {
    to_real(raw, PRICE_SCALE)
}
