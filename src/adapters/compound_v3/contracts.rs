// Comet and collateral swap router contract interfaces
use alloy::sol;

use crate::models::AssetRiskInfo;

sol! {
    #[sol(rpc)]
    interface IComet {
        struct AssetInfo {
            uint8 offset;
            address asset;
            address priceFeed;
            uint64 scale;
            uint64 borrowCollateralFactor;
            uint64 liquidateCollateralFactor;
            uint64 liquidationFactor;
            uint128 supplyCap;
        }

        function numAssets() external view returns (uint8);
        function getAssetInfo(uint8 i) external view returns (AssetInfo memory);
        function factorScale() external pure returns (uint64);

        function collateralBalanceOf(address account, address asset) external view returns (uint128);
        function borrowBalanceOf(address account) external view returns (uint256);
        function getPrice(address priceFeed) external view returns (uint256);

        function isBorrowCollateralized(address account) external view returns (bool);
        function isLiquidatable(address account) external view returns (bool);
    }

    #[sol(rpc, all_derives)]
    interface ICollateralSwapRouter {
        #[derive(Debug)]
        struct SwapExactInParams {
            address comet;
            address account;
            address fromAsset;
            address toAsset;
            uint256 fromAmount;
            uint256 minToAsset;
            bytes swapData;
            bool useFlashLoan;
            address receiver;
        }

        function swapCollateralExactIn(SwapExactInParams calldata params) external;
        function previewDirectWithdrawHeadroom(address comet, address account, address asset, uint256 withdrawAmount)
            external view returns (bool canWithdrawSafely, uint256 newBorrowCapacity);
    }
}

impl From<IComet::AssetInfo> for AssetRiskInfo {
    fn from(info: IComet::AssetInfo) -> Self {
        Self {
            offset: info.offset,
            asset: info.asset,
            price_feed: info.priceFeed,
            scale: info.scale,
            borrow_collateral_factor: info.borrowCollateralFactor,
            liquidate_collateral_factor: info.liquidateCollateralFactor,
            liquidation_factor: info.liquidationFactor,
            supply_cap: info.supplyCap,
        }
    }
}
