// Display helpers for amounts, prices and health factors
use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::risk::HealthFactor;

/// Native token amount rendered with a fixed number of decimals.
pub fn format_token_amount(raw: U256, decimals: u8, precision: usize) -> String {
    let amount = BigDecimal::from_str(&format!("{}e-{}", raw, decimals))
        .ok()
        .and_then(|value| value.to_f64())
        .unwrap_or(0.0);
    format!("{:.*}", precision, amount)
}

/// US dollar amount with thousands separators, e.g. `$1,234.56`.
/// Rounds half away from zero.
pub fn format_usd(amount: f64, precision: u32) -> String {
    let value = match Decimal::try_from(amount) {
        Ok(value) => value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero),
        Err(_) => return "N/A".to_string(),
    };

    let sign = if value.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    let digits = format!("{:.*}", precision as usize, value.abs());
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match fraction {
        Some(fraction) => format!("{}${}.{}", sign, grouped, fraction),
        None => format!("{}${}", sign, grouped),
    }
}

/// Checksummed address shortened to `0x1234...abcd` form.
pub fn format_address(address: &Address, length: usize) -> String {
    let full = address.to_checksum(None);
    if full.len() <= length * 2 + 2 {
        return full;
    }
    format!("{}...{}", &full[..length + 2], &full[full.len() - length..])
}

/// Same rendering as the `Display` impl: two decimals, "∞" or "N/A".
pub fn format_health_factor(health_factor: HealthFactor) -> String {
    health_factor.to_string()
}

/// Ratio rendered as a percentage: `0.125` becomes `12.50%`.
pub fn format_percentage(value: f64, precision: usize) -> String {
    format!("{:.*}%", precision, value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_format_token_amount() {
        let one_and_half_eth = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(format_token_amount(one_and_half_eth, 18, 6), "1.500000");
        assert_eq!(format_token_amount(U256::from(123_456_789u64), 6, 2), "123.46");
        assert_eq!(format_token_amount(U256::ZERO, 8, 4), "0.0000");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1234.56, 2), "$1,234.56");
        assert_eq!(format_usd(1_000_000.0, 2), "$1,000,000.00");
        assert_eq!(format_usd(999.995, 2), "$1,000.00");
        assert_eq!(format_usd(0.125, 2), "$0.13");
        assert_eq!(format_usd(-42.5, 0), "-$43");
        assert_eq!(format_usd(12.0, 0), "$12");
        assert_eq!(format_usd(f64::NAN, 2), "N/A");
    }

    #[test]
    fn test_format_address() {
        let weth = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
        assert_eq!(format_address(&weth, 6), "0xC02aaA...756Cc2");
        assert_eq!(format_address(&weth, 4), "0xC02a...6Cc2");
        assert_eq!(format_address(&weth, 20), weth.to_checksum(None));
    }

    #[test]
    fn test_format_health_factor() {
        assert_eq!(format_health_factor(HealthFactor::Value(1.23456)), "1.23");
        assert_eq!(format_health_factor(HealthFactor::Value(0.0)), "0.00");
        assert_eq!(format_health_factor(HealthFactor::Infinite), "∞");
        assert_eq!(format_health_factor(HealthFactor::NotApplicable), "N/A");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.125, 2), "12.50%");
        assert_eq!(format_percentage(1.0, 0), "100%");
    }
}
