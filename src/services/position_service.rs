use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::adapters::compound_v3::contracts::ICollateralSwapRouter::{
    swapCollateralExactInCall, SwapExactInParams,
};
use crate::adapters::{AccountStatus, MarketDataSource};
use crate::error::AppError;
use crate::models::{
    validate_swap_request, MarketRiskParameters, PriceMap, SwapRequest, SwapValidationError,
};
use crate::risk::{
    compute_position, liquidation_price, price_to_real, recommend_mode, ExecutionMode,
    ModeRecommendation, PositionSnapshot, RiskError,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidationPrice {
    pub asset: Address,
    /// `None` when the asset has no meaningful liquidation price.
    pub price: Option<f64>,
}

/// Everything the swap form needs to render one account's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub market: Address,
    pub account: Address,
    pub snapshot: PositionSnapshot,
    pub recommendation: ModeRecommendation,
    pub liquidation_prices: Vec<LiquidationPrice>,
    /// Protocol's own flags; `None` when they could not be read.
    pub status: Option<AccountStatus>,
    pub computed_at: DateTime<Utc>,
}

/// A validated swap, ready to send to the router.
#[derive(Debug, Clone)]
pub struct PreparedSwap {
    pub router: Address,
    pub params: SwapExactInParams,
    pub mode: ExecutionMode,
    pub recommendation: ModeRecommendation,
}

impl PreparedSwap {
    /// ABI-encoded `swapCollateralExactIn` call data.
    pub fn calldata(&self) -> Bytes {
        swapCollateralExactInCall {
            params: self.params.clone(),
        }
        .abi_encode()
        .into()
    }
}

pub struct PositionService<S: MarketDataSource> {
    source: Arc<S>,
    router: Option<Address>,
    market_params: RwLock<Option<Arc<MarketRiskParameters>>>,
}

impl<S: MarketDataSource> PositionService<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            router: None,
            market_params: RwLock::new(None),
        }
    }

    /// Collateral swap router that `prepare_swap` targets.
    pub fn with_router(mut self, router: Option<Address>) -> Self {
        self.router = router;
        self
    }

    pub fn router(&self) -> Option<Address> {
        self.router
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Cached market parameters, loaded on first use.
    pub async fn market_parameters(&self) -> Result<Arc<MarketRiskParameters>, AppError> {
        if let Some(params) = self.market_params.read().await.as_ref() {
            return Ok(Arc::clone(params));
        }
        self.reload_market_parameters().await
    }

    /// Re-read the market parameters, replacing the cached copy.
    pub async fn reload_market_parameters(&self) -> Result<Arc<MarketRiskParameters>, AppError> {
        let params = self.source.fetch_market_parameters().await?;
        if params.factor_scale == 0 {
            return Err(RiskError::InvalidFactorScale { factor_scale: 0 }.into());
        }

        let params = Arc::new(params);
        *self.market_params.write().await = Some(Arc::clone(&params));

        info!(
            market = %self.source.market_address(),
            assets = params.assets.len(),
            "Market parameters cached"
        );
        Ok(params)
    }

    /// Read the account's balances and prices and run the risk engine on them.
    pub async fn refresh(&self, account: Address) -> Result<PositionReport, AppError> {
        let params = self.market_parameters().await?;
        let feeds = params.price_feeds();

        let (balances_and_prices, status) = futures::join!(
            futures::future::try_join(
                self.source.fetch_account_balances(account, &params),
                self.source.fetch_prices(&feeds),
            ),
            self.source.fetch_account_status(account),
        );
        let (balances, raw_prices) = balances_and_prices?;

        let status = match status {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(account = %account, error = %e, "Failed to read account status");
                None
            }
        };

        let feed_prices = convert_prices(&raw_prices)?;
        let prices = params.prices_by_asset(&feed_prices);

        let snapshot = compute_position(
            &balances.collateral_balances,
            &params.risk_info_by_asset(),
            &prices,
            balances.borrow_balance,
            params.factor_scale,
        )?;
        let recommendation = recommend_mode(snapshot.health_factor);

        let mut liquidation_prices = Vec::with_capacity(snapshot.assets.len());
        for row in &snapshot.assets {
            let Some(risk_info) = params.get(&row.asset) else {
                continue;
            };
            let price = liquidation_price(
                row.balance,
                risk_info,
                snapshot.borrow_balance,
                params.factor_scale,
            )?;
            liquidation_prices.push(LiquidationPrice {
                asset: row.asset,
                price: (price > 0.0).then_some(price),
            });
        }

        if let Some(status) = status {
            if status.is_liquidatable {
                warn!(account = %account, "Protocol reports account as liquidatable");
            }
        }

        info!(
            account = %account,
            health_factor = %snapshot.health_factor,
            collateral_usd = snapshot.total_collateral_value,
            borrow_usd = snapshot.total_borrow_value,
            tier = recommendation.tier.label(),
            mode = ?recommendation.mode,
            "Position refreshed"
        );

        Ok(PositionReport {
            market: self.source.market_address(),
            account,
            snapshot,
            recommendation,
            liquidation_prices,
            status,
            computed_at: Utc::now(),
        })
    }

    /// Validate a swap against a fresh read of the position and build the
    /// router parameters. A direct swap must also pass the router's
    /// withdraw headroom check.
    pub async fn prepare_swap(
        &self,
        account: Address,
        receiver: Address,
        request: SwapRequest,
        swap_data: Bytes,
    ) -> Result<PreparedSwap, AppError> {
        let router = self
            .router
            .ok_or_else(|| AppError::ConfigError("Router address not configured".to_string()))?;

        let report = self.refresh(account).await?;
        let params = self.market_parameters().await?;

        let posted = report
            .snapshot
            .collateral_balances
            .get(&request.from_asset)
            .copied()
            .unwrap_or(U256::ZERO);
        validate_swap_request(&request, &params, Some(posted))?;

        let mode = request.execution_mode(&report.recommendation);
        if mode != report.recommendation.mode {
            debug!(
                account = %account,
                requested = ?mode,
                recommended = ?report.recommendation.mode,
                "Swap mode overrides recommendation"
            );
        }

        if mode == ExecutionMode::Direct {
            let headroom = self
                .source
                .preview_direct_withdraw(router, account, request.from_asset, request.from_amount)
                .await?;
            if !headroom.can_withdraw_safely {
                warn!(
                    account = %account,
                    asset = %request.from_asset,
                    amount = %request.from_amount,
                    "Direct withdraw would leave position unsafe"
                );
                return Err(SwapValidationError::UnsafeDirectWithdraw {
                    asset: request.from_asset,
                    amount: request.from_amount,
                }
                .into());
            }
        }

        let params = request.into_params(
            report.market,
            account,
            receiver,
            swap_data,
            &report.recommendation,
        );

        Ok(PreparedSwap {
            router,
            params,
            mode,
            recommendation: report.recommendation,
        })
    }
}

fn convert_prices(raw_prices: &HashMap<Address, U256>) -> Result<PriceMap, RiskError> {
    raw_prices
        .iter()
        .map(|(feed, raw)| Ok((*feed, price_to_real(*raw)?)))
        .collect()
}
