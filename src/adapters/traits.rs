use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{AccountBalances, MarketRiskParameters};

/// Errors raised while reading market state
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract call failed: {0}")]
    ContractError(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}

/// The protocol's own view of an account, read alongside the balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatus {
    pub is_borrow_collateralized: bool,
    pub is_liquidatable: bool,
}

/// Router's view of withdrawing collateral directly, without a flash loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawHeadroom {
    pub can_withdraw_safely: bool,
    pub new_borrow_capacity: U256,
}

/// Source of the raw inputs the risk engine consumes.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Address of the Comet market this source reads.
    fn market_address(&self) -> Address;

    /// Factor scale and risk parameters of every listed collateral asset.
    async fn fetch_market_parameters(&self) -> Result<MarketRiskParameters, AdapterError>;

    /// Collateral balance of every listed asset plus the borrow balance.
    async fn fetch_account_balances(
        &self,
        account: Address,
        params: &MarketRiskParameters,
    ) -> Result<AccountBalances, AdapterError>;

    /// Raw 8-decimal prices keyed by price feed.
    async fn fetch_prices(&self, price_feeds: &[Address]) -> Result<HashMap<Address, U256>, AdapterError>;

    async fn fetch_account_status(&self, account: Address) -> Result<AccountStatus, AdapterError>;

    /// Ask the swap router whether withdrawing `amount` of `asset` keeps the
    /// account collateralized.
    async fn preview_direct_withdraw(
        &self,
        router: Address,
        account: Address,
        asset: Address,
        amount: U256,
    ) -> Result<WithdrawHeadroom, AdapterError>;
}
