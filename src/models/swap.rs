use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::compound_v3::contracts::ICollateralSwapRouter::SwapExactInParams;
use crate::models::MarketRiskParameters;
use crate::risk::{ExecutionMode, ModeRecommendation};

pub const MIN_SLIPPAGE_PCT: f64 = 0.01;
pub const MAX_SLIPPAGE_PCT: f64 = 50.0;
pub const DEFAULT_SLIPPAGE_PCT: f64 = 0.5;

const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapValidationError {
    #[error("Source and destination assets must be different")]
    SameAsset,

    #[error("Asset {asset} is not listed as collateral in this market")]
    UnlistedAsset { asset: Address },

    #[error("Swap amount must be greater than 0")]
    ZeroAmount,

    #[error("Minimum amount must be greater than 0")]
    ZeroMinimumOutput,

    #[error("Swap amount {requested} exceeds posted collateral {available}")]
    InsufficientCollateral { requested: U256, available: U256 },

    #[error("Withdrawing {amount} of {asset} directly would leave the position under-collateralized")]
    UnsafeDirectWithdraw { asset: Address, amount: U256 },

    #[error("Slippage must be at least 0.01%, got {slippage_pct}%")]
    SlippageTooLow { slippage_pct: f64 },

    #[error("Slippage cannot exceed 50%, got {slippage_pct}%")]
    SlippageTooHigh { slippage_pct: f64 },
}

/// A collateral swap the user wants to make, in native units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub from_asset: Address,
    pub to_asset: Address,
    pub from_amount: U256,
    pub min_to_asset: U256,
    /// Explicit mode choice; `None` follows the recommendation.
    pub use_flash_loan: Option<bool>,
    pub slippage_pct: f64,
}

impl SwapRequest {
    pub fn execution_mode(&self, recommendation: &ModeRecommendation) -> ExecutionMode {
        match self.use_flash_loan {
            Some(true) => ExecutionMode::Flash,
            Some(false) => ExecutionMode::Direct,
            None => recommendation.mode,
        }
    }

    /// Router call parameters for `swapCollateralExactIn`.
    pub fn into_params(
        self,
        comet: Address,
        account: Address,
        receiver: Address,
        swap_data: Bytes,
        recommendation: &ModeRecommendation,
    ) -> SwapExactInParams {
        let use_flash_loan = self.execution_mode(recommendation).uses_flash_loan();

        SwapExactInParams {
            comet,
            account,
            fromAsset: self.from_asset,
            toAsset: self.to_asset,
            fromAmount: self.from_amount,
            minToAsset: self.min_to_asset,
            swapData: swap_data,
            useFlashLoan: use_flash_loan,
            receiver,
        }
    }
}

pub fn validate_slippage(slippage_pct: f64) -> Result<(), SwapValidationError> {
    if slippage_pct.is_nan() || slippage_pct < MIN_SLIPPAGE_PCT {
        return Err(SwapValidationError::SlippageTooLow { slippage_pct });
    }
    if slippage_pct > MAX_SLIPPAGE_PCT {
        return Err(SwapValidationError::SlippageTooHigh { slippage_pct });
    }
    Ok(())
}

/// Validate a swap request against the market listing and, when known, the
/// account's posted balance of the source asset.
pub fn validate_swap_request(
    request: &SwapRequest,
    params: &MarketRiskParameters,
    posted_balance: Option<U256>,
) -> Result<(), SwapValidationError> {
    if request.from_asset == request.to_asset {
        return Err(SwapValidationError::SameAsset);
    }
    for asset in [request.from_asset, request.to_asset] {
        if params.get(&asset).is_none() {
            return Err(SwapValidationError::UnlistedAsset { asset });
        }
    }
    if request.from_amount.is_zero() {
        return Err(SwapValidationError::ZeroAmount);
    }
    if request.min_to_asset.is_zero() {
        return Err(SwapValidationError::ZeroMinimumOutput);
    }
    if let Some(available) = posted_balance {
        if request.from_amount > available {
            return Err(SwapValidationError::InsufficientCollateral {
                requested: request.from_amount,
                available,
            });
        }
    }
    validate_slippage(request.slippage_pct)
}

/// Minimum acceptable output for an expected output and slippage tolerance,
/// rounded down to whole basis points of tolerance.
pub fn min_output_for_slippage(
    expected_out: U256,
    slippage_pct: f64,
) -> Result<U256, SwapValidationError> {
    validate_slippage(slippage_pct)?;

    let slippage_bps = (slippage_pct * 100.0).round() as u64;
    let keep_bps = U256::from(BPS_DENOMINATOR - slippage_bps);
    let denominator = U256::from(BPS_DENOMINATOR);

    Ok(match expected_out.checked_mul(keep_bps) {
        Some(product) => product / denominator,
        None => expected_out / denominator * keep_bps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetRiskInfo;
    use crate::risk::RiskTier;

    fn listed(byte: u8) -> AssetRiskInfo {
        AssetRiskInfo {
            offset: byte,
            asset: Address::repeat_byte(byte),
            price_feed: Address::repeat_byte(0xf0 | byte),
            scale: 1_000_000_000_000_000_000,
            borrow_collateral_factor: 800_000_000_000_000_000,
            liquidate_collateral_factor: 850_000_000_000_000_000,
            liquidation_factor: 950_000_000_000_000_000,
            supply_cap: 0,
        }
    }

    fn market() -> MarketRiskParameters {
        MarketRiskParameters::new(1_000_000_000_000_000_000, vec![listed(1), listed(2)])
    }

    fn request() -> SwapRequest {
        SwapRequest {
            from_asset: Address::repeat_byte(1),
            to_asset: Address::repeat_byte(2),
            from_amount: U256::from(1_000u64),
            min_to_asset: U256::from(990u64),
            use_flash_loan: None,
            slippage_pct: DEFAULT_SLIPPAGE_PCT,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(validate_swap_request(&request(), &market(), Some(U256::from(5_000u64))).is_ok());
        assert!(validate_swap_request(&request(), &market(), None).is_ok());
    }

    #[test]
    fn test_invalid_requests() {
        let mut same = request();
        same.to_asset = same.from_asset;
        assert_eq!(
            validate_swap_request(&same, &market(), None),
            Err(SwapValidationError::SameAsset)
        );

        let mut unlisted = request();
        unlisted.to_asset = Address::repeat_byte(9);
        assert_eq!(
            validate_swap_request(&unlisted, &market(), None),
            Err(SwapValidationError::UnlistedAsset {
                asset: Address::repeat_byte(9)
            })
        );

        let mut zero = request();
        zero.from_amount = U256::ZERO;
        assert_eq!(
            validate_swap_request(&zero, &market(), None),
            Err(SwapValidationError::ZeroAmount)
        );

        let mut no_min = request();
        no_min.min_to_asset = U256::ZERO;
        assert_eq!(
            validate_swap_request(&no_min, &market(), None),
            Err(SwapValidationError::ZeroMinimumOutput)
        );

        assert!(matches!(
            validate_swap_request(&request(), &market(), Some(U256::from(10u64))),
            Err(SwapValidationError::InsufficientCollateral { .. })
        ));
    }

    #[test]
    fn test_slippage_bounds() {
        assert!(validate_slippage(0.01).is_ok());
        assert!(validate_slippage(50.0).is_ok());
        assert!(matches!(validate_slippage(0.001), Err(SwapValidationError::SlippageTooLow { .. })));
        assert!(matches!(validate_slippage(f64::NAN), Err(SwapValidationError::SlippageTooLow { .. })));
        assert!(matches!(validate_slippage(50.5), Err(SwapValidationError::SlippageTooHigh { .. })));
    }

    #[test]
    fn test_min_output_for_slippage() {
        let expected = U256::from(1_000_000u64);
        assert_eq!(min_output_for_slippage(expected, 0.5).unwrap(), U256::from(995_000u64));
        assert_eq!(min_output_for_slippage(expected, 50.0).unwrap(), U256::from(500_000u64));
        assert_eq!(min_output_for_slippage(U256::from(999u64), 1.0).unwrap(), U256::from(989u64));
        assert!(min_output_for_slippage(expected, 75.0).is_err());
    }

    #[test]
    fn test_params_follow_recommendation_unless_overridden() {
        let flash = ModeRecommendation {
            mode: ExecutionMode::Flash,
            tier: RiskTier::AtRisk,
        };
        let account = Address::repeat_byte(0xaa);
        let comet = Address::repeat_byte(0xcc);

        let params = request().into_params(comet, account, account, Bytes::new(), &flash);
        assert!(params.useFlashLoan);
        assert_eq!(params.comet, comet);
        assert_eq!(params.fromAmount, U256::from(1_000u64));

        let mut direct = request();
        direct.use_flash_loan = Some(false);
        let params = direct.into_params(comet, account, account, Bytes::new(), &flash);
        assert!(!params.useFlashLoan);
    }
}
