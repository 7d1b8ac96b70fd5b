use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::risk::RiskError;

/// Asset -> raw collateral balance in the asset's native units.
pub type CollateralBalances = HashMap<Address, U256>;
/// Asset (or price feed) -> USD price.
pub type PriceMap = HashMap<Address, f64>;
/// Asset -> risk parameters.
pub type RiskInfoMap = HashMap<Address, AssetRiskInfo>;

/// Risk parameters of one collateral asset, as listed by the Comet market.
///
/// Factor fields are integer numerators over the market-wide factor scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRiskInfo {
    pub offset: u8,
    pub asset: Address,
    pub price_feed: Address,
    pub scale: u64,
    pub borrow_collateral_factor: u64,
    pub liquidate_collateral_factor: u64,
    pub liquidation_factor: u64,
    pub supply_cap: u128,
}

impl AssetRiskInfo {
    /// Check the parameters against the contract the risk engine relies on.
    pub fn validate(&self, factor_scale: u64) -> Result<(), RiskError> {
        if factor_scale == 0 {
            return Err(RiskError::InvalidFactorScale { factor_scale });
        }
        if self.scale == 0 {
            return Err(RiskError::InvalidScale { scale: self.scale });
        }

        let factors = [
            ("borrow_collateral_factor", self.borrow_collateral_factor),
            ("liquidate_collateral_factor", self.liquidate_collateral_factor),
            ("liquidation_factor", self.liquidation_factor),
        ];
        for (field, value) in factors {
            if value > factor_scale {
                return Err(RiskError::InvalidFactor {
                    asset: self.asset,
                    field,
                    value,
                    factor_scale,
                });
            }
        }

        Ok(())
    }

    pub fn borrow_collateral_ratio(&self, factor_scale: u64) -> f64 {
        self.borrow_collateral_factor as f64 / factor_scale as f64
    }

    pub fn liquidate_collateral_ratio(&self, factor_scale: u64) -> f64 {
        self.liquidate_collateral_factor as f64 / factor_scale as f64
    }

    pub fn liquidation_ratio(&self, factor_scale: u64) -> f64 {
        self.liquidation_factor as f64 / factor_scale as f64
    }
}

/// Immutable snapshot of a market's collateral risk parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRiskParameters {
    pub factor_scale: u64,
    pub assets: Vec<AssetRiskInfo>,
}

impl MarketRiskParameters {
    pub fn new(factor_scale: u64, assets: Vec<AssetRiskInfo>) -> Self {
        Self {
            factor_scale,
            assets,
        }
    }

    pub fn get(&self, asset: &Address) -> Option<&AssetRiskInfo> {
        self.assets.iter().find(|info| &info.asset == asset)
    }

    pub fn risk_info_by_asset(&self) -> RiskInfoMap {
        self.assets
            .iter()
            .map(|info| (info.asset, info.clone()))
            .collect()
    }

    /// Distinct price feeds referenced by the listed assets, in listing order.
    pub fn price_feeds(&self) -> Vec<Address> {
        let mut feeds = Vec::with_capacity(self.assets.len());
        for info in &self.assets {
            if !feeds.contains(&info.price_feed) {
                feeds.push(info.price_feed);
            }
        }
        feeds
    }

    /// Re-key a feed-indexed price book by asset. Assets whose feed has no
    /// price are left out.
    pub fn prices_by_asset(&self, feed_prices: &PriceMap) -> PriceMap {
        self.assets
            .iter()
            .filter_map(|info| {
                feed_prices
                    .get(&info.price_feed)
                    .map(|price| (info.asset, *price))
            })
            .collect()
    }
}

/// Raw balances of one account in a Comet market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalances {
    pub account: Address,
    pub collateral_balances: CollateralBalances,
    pub borrow_balance: U256,
}
