// Position aggregation: collateral value, borrow capacity, health factor
// and liquidation price for a Comet borrow position.
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::models::{AssetRiskInfo, CollateralBalances, MarketRiskParameters, PriceMap, RiskInfoMap};
use crate::risk::fixed_point::{base_to_real, to_real};
use crate::risk::RiskError;

/// Ratio of risk-weighted borrow capacity to borrow value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HealthFactor {
    /// Finite, non-negative ratio. Never NaN or infinite.
    Value(f64),
    /// No debt but some collateral.
    Infinite,
    /// Neither debt nor collateral.
    NotApplicable,
}

impl HealthFactor {
    pub fn value(&self) -> Option<f64> {
        match self {
            HealthFactor::Value(value) => Some(*value),
            _ => None,
        }
    }

    /// True for the no-debt sentinels.
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, HealthFactor::Value(_))
    }

    /// Debt exceeds borrow capacity.
    pub fn is_undercollateralized(&self) -> bool {
        matches!(self, HealthFactor::Value(value) if *value < 1.0)
    }
}

impl fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthFactor::Value(value) => write!(f, "{:.2}", value),
            HealthFactor::Infinite => write!(f, "∞"),
            HealthFactor::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// Per-asset row of a position, only produced for non-zero balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPosition {
    pub asset: Address,
    pub balance: U256,
    pub amount: f64,
    pub price: f64,
    pub value_usd: f64,
    pub borrow_capacity_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub collateral_balances: CollateralBalances,
    pub borrow_balance: U256,
    pub total_collateral_value: f64,
    pub borrow_capacity: f64,
    pub total_borrow_value: f64,
    pub health_factor: HealthFactor,
    pub assets: Vec<AssetPosition>,
}

impl PositionSnapshot {
    /// Liquidation price of `asset` given the snapshot's balances, or `None`
    /// when the market does not list the asset. A returned `0.0` means the
    /// asset has no meaningful liquidation price.
    pub fn liquidation_price_for(
        &self,
        asset: &Address,
        params: &MarketRiskParameters,
    ) -> Result<Option<f64>, RiskError> {
        let Some(risk_info) = params.get(asset) else {
            return Ok(None);
        };
        let balance = self
            .collateral_balances
            .get(asset)
            .copied()
            .unwrap_or(U256::ZERO);

        liquidation_price(balance, risk_info, self.borrow_balance, params.factor_scale).map(Some)
    }

    /// Borrow capacity left before the position reaches a health factor of 1.
    pub fn available_borrow_capacity(&self) -> f64 {
        (self.borrow_capacity - self.total_borrow_value).max(0.0)
    }

    /// Share of borrow capacity in use, `None` without capacity.
    pub fn utilization(&self) -> Option<f64> {
        if self.borrow_capacity > 0.0 {
            Some(self.total_borrow_value / self.borrow_capacity)
        } else {
            None
        }
    }
}

fn validate_price(asset: Address, price: f64) -> Result<(), RiskError> {
    if !price.is_finite() || price < 0.0 {
        return Err(RiskError::InvalidPrice { asset, price });
    }
    Ok(())
}

/// Reject results that overflowed `f64` or went NaN.
fn ensure_finite(quantity: &'static str, value: f64) -> Result<f64, RiskError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RiskError::NonFinite { quantity, value })
    }
}

fn collateral_value(
    collateral_balance: U256,
    risk_info: &AssetRiskInfo,
    price: f64,
) -> Result<(f64, f64), RiskError> {
    let amount = to_real(collateral_balance, risk_info.scale)?;
    Ok((amount, ensure_finite("collateral value", amount * price)?))
}

fn weighted_capacity(value: f64, risk_info: &AssetRiskInfo, factor_scale: u64) -> Result<f64, RiskError> {
    ensure_finite(
        "borrow capacity",
        value * risk_info.borrow_collateral_factor as f64 / factor_scale as f64,
    )
}

/// USD borrow capacity contributed by a single collateral balance.
pub fn borrow_capacity(
    collateral_balance: U256,
    risk_info: &AssetRiskInfo,
    price: f64,
    factor_scale: u64,
) -> Result<f64, RiskError> {
    risk_info.validate(factor_scale)?;
    validate_price(risk_info.asset, price)?;

    let (_, value) = collateral_value(collateral_balance, risk_info, price)?;
    weighted_capacity(value, risk_info, factor_scale)
}

/// Aggregate a position from raw balances, risk parameters and prices.
///
/// Assets that have a balance but no risk info or a zero or missing price
/// contribute nothing; a market may list assets that are not priced yet.
pub fn compute_position(
    balances: &CollateralBalances,
    risk_info_by_asset: &RiskInfoMap,
    prices_by_asset: &PriceMap,
    borrow_balance: U256,
    factor_scale: u64,
) -> Result<PositionSnapshot, RiskError> {
    if factor_scale == 0 {
        return Err(RiskError::InvalidFactorScale { factor_scale });
    }

    let mut total_collateral_value = 0.0;
    let mut total_borrow_capacity = 0.0;
    let mut rows: Vec<(u8, AssetPosition)> = Vec::new();

    for (asset, balance) in balances {
        if balance.is_zero() {
            continue;
        }
        let (Some(risk_info), Some(price)) =
            (risk_info_by_asset.get(asset), prices_by_asset.get(asset))
        else {
            debug!(asset = %asset, "Skipping collateral without risk info or price");
            continue;
        };

        risk_info.validate(factor_scale)?;
        validate_price(*asset, *price)?;
        if *price == 0.0 {
            debug!(asset = %asset, "Skipping collateral with a zero price");
            continue;
        }

        let (amount, value) = collateral_value(*balance, risk_info, *price)?;
        let capacity = weighted_capacity(value, risk_info, factor_scale)?;

        total_collateral_value = ensure_finite("collateral value", total_collateral_value + value)?;
        total_borrow_capacity = ensure_finite("borrow capacity", total_borrow_capacity + capacity)?;

        rows.push((
            risk_info.offset,
            AssetPosition {
                asset: *asset,
                balance: *balance,
                amount,
                price: *price,
                value_usd: value,
                borrow_capacity_usd: capacity,
            },
        ));
    }

    rows.sort_by_key(|(offset, _)| *offset);

    let total_borrow_value = base_to_real(borrow_balance)?;

    let health_factor = if total_borrow_value == 0.0 {
        if total_collateral_value == 0.0 {
            HealthFactor::NotApplicable
        } else {
            HealthFactor::Infinite
        }
    } else if total_borrow_capacity == 0.0 {
        HealthFactor::Value(0.0)
    } else {
        HealthFactor::Value(ensure_finite(
            "health factor",
            total_borrow_capacity / total_borrow_value,
        )?)
    };

    debug!(
        total_collateral_value,
        borrow_capacity = total_borrow_capacity,
        total_borrow_value,
        health_factor = %health_factor,
        "Position computed"
    );

    Ok(PositionSnapshot {
        collateral_balances: balances.clone(),
        borrow_balance,
        total_collateral_value,
        borrow_capacity: total_borrow_capacity,
        total_borrow_value,
        health_factor,
        assets: rows.into_iter().map(|(_, row)| row).collect(),
    })
}

/// Price of the asset at which the position becomes liquidatable, holding
/// balances constant. Returns `0.0` when there is no collateral of this asset
/// (or no liquidation factor), which callers must read as "not applicable".
pub fn liquidation_price(
    collateral_balance: U256,
    risk_info: &AssetRiskInfo,
    borrow_balance: U256,
    factor_scale: u64,
) -> Result<f64, RiskError> {
    risk_info.validate(factor_scale)?;

    if collateral_balance.is_zero() {
        return Ok(0.0);
    }

    let collateral_amount = to_real(collateral_balance, risk_info.scale)?;
    let borrow_value = base_to_real(borrow_balance)?;
    let liquidation_factor = risk_info.liquidation_ratio(factor_scale);

    let denominator = collateral_amount * liquidation_factor;
    if denominator == 0.0 {
        return Ok(0.0);
    }

    ensure_finite("liquidation price", borrow_value / denominator)
}
