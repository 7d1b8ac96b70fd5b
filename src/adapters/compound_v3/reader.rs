// On-chain reader for a single Comet market
use alloy::{
    primitives::{Address, U256},
    providers::{ProviderBuilder, RootProvider},
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::IntoFuture;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use crate::adapters::compound_v3::contracts::{ICollateralSwapRouter, IComet};
use crate::adapters::{AccountStatus, AdapterError, MarketDataSource, WithdrawHeadroom};
use crate::config::Settings;
use crate::models::{AccountBalances, AssetRiskInfo, CollateralBalances, MarketRiskParameters};

#[derive(Debug, Clone)]
pub struct CometReader {
    provider: RootProvider<Http<Client>>,
    comet: Address,
    call_timeout: Duration,
}

impl CometReader {
    pub fn new(rpc_url: &str, comet: Address, call_timeout: Duration) -> Result<Self, AdapterError> {
        let provider = ProviderBuilder::new().on_http(
            rpc_url
                .parse()
                .map_err(|e| AdapterError::RpcError(format!("Invalid RPC URL: {}", e)))?,
        );

        Ok(Self {
            provider,
            comet,
            call_timeout,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AdapterError> {
        Self::new(
            &settings.rpc.url,
            settings.market.comet_address,
            Duration::from_secs(settings.rpc.request_timeout_seconds),
        )
    }

    async fn timed<T, E, F>(&self, call_name: &str, call: F) -> Result<T, AdapterError>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Debug,
    {
        timeout(self.call_timeout, call)
            .await
            .map_err(|_| AdapterError::Timeout(format!("{} timed out", call_name)))?
            .map_err(|e| AdapterError::ContractError(format!("{} failed: {:?}", call_name, e)))
    }
}

#[async_trait]
impl MarketDataSource for CometReader {
    fn market_address(&self) -> Address {
        self.comet
    }

    async fn fetch_market_parameters(&self) -> Result<MarketRiskParameters, AdapterError> {
        let comet = IComet::new(self.comet, &self.provider);

        let factor_scale = self.timed("factorScale", comet.factorScale().call()).await?._0;
        let num_assets = self.timed("numAssets", comet.numAssets().call()).await?._0;

        let comet = &comet;
        let requests = (0..num_assets).map(|index| async move {
            self.timed("getAssetInfo", comet.getAssetInfo(index).call())
                .await
                .map(|info| AssetRiskInfo::from(info._0))
        });
        let assets = try_join_all(requests).await?;

        info!(
            market = %self.comet,
            factor_scale,
            num_assets,
            "Loaded market risk parameters"
        );

        Ok(MarketRiskParameters::new(factor_scale, assets))
    }

    async fn fetch_account_balances(
        &self,
        account: Address,
        params: &MarketRiskParameters,
    ) -> Result<AccountBalances, AdapterError> {
        let comet = IComet::new(self.comet, &self.provider);
        let comet = &comet;

        let collateral = try_join_all(params.assets.iter().map(|info| {
            let asset = info.asset;
            async move {
                let balance = self
                    .timed("collateralBalanceOf", comet.collateralBalanceOf(account, asset).call())
                    .await?
                    ._0;
                Ok::<_, AdapterError>((asset, U256::from(balance)))
            }
        }));
        let borrow = async {
            self.timed("borrowBalanceOf", comet.borrowBalanceOf(account).call())
                .await
                .map(|balance| balance._0)
        };

        let (collateral, borrow_balance) = futures::try_join!(collateral, borrow)?;
        let collateral_balances: CollateralBalances = collateral.into_iter().collect();

        debug!(
            account = %account,
            assets = collateral_balances.len(),
            borrow_balance = %borrow_balance,
            "Fetched account balances"
        );

        Ok(AccountBalances {
            account,
            collateral_balances,
            borrow_balance,
        })
    }

    async fn fetch_prices(&self, price_feeds: &[Address]) -> Result<HashMap<Address, U256>, AdapterError> {
        let comet = IComet::new(self.comet, &self.provider);
        let comet = &comet;

        let prices = try_join_all(price_feeds.iter().map(|feed| {
            let feed = *feed;
            async move {
                let price = self.timed("getPrice", comet.getPrice(feed).call()).await?._0;
                Ok::<_, AdapterError>((feed, price))
            }
        }))
        .await?;

        Ok(prices.into_iter().collect())
    }

    async fn fetch_account_status(&self, account: Address) -> Result<AccountStatus, AdapterError> {
        let comet = IComet::new(self.comet, &self.provider);

        let collateralized_call = comet.isBorrowCollateralized(account);
        let liquidatable_call = comet.isLiquidatable(account);
        let collateralized = self.timed("isBorrowCollateralized", collateralized_call.call());
        let liquidatable = self.timed("isLiquidatable", liquidatable_call.call());
        let (collateralized, liquidatable) = futures::try_join!(collateralized, liquidatable)?;

        Ok(AccountStatus {
            is_borrow_collateralized: collateralized._0,
            is_liquidatable: liquidatable._0,
        })
    }

    async fn preview_direct_withdraw(
        &self,
        router: Address,
        account: Address,
        asset: Address,
        amount: U256,
    ) -> Result<WithdrawHeadroom, AdapterError> {
        let router = ICollateralSwapRouter::new(router, &self.provider);
        let preview = self
            .timed(
                "previewDirectWithdrawHeadroom",
                router
                    .previewDirectWithdrawHeadroom(self.comet, account, asset, amount)
                    .call(),
            )
            .await?;

        debug!(
            account = %account,
            asset = %asset,
            can_withdraw_safely = preview.canWithdrawSafely,
            "Previewed direct withdraw"
        );

        Ok(WithdrawHeadroom {
            can_withdraw_safely: preview.canWithdrawSafely,
            new_borrow_capacity: preview.newBorrowCapacity,
        })
    }
}
