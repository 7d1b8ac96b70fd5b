use alloy::primitives::{Address, U256};
use comet_collateral_swap::{
    models::{AssetRiskInfo, CollateralBalances, MarketRiskParameters, PriceMap, RiskInfoMap},
    risk::{
        base_to_real, borrow_capacity, compute_position, liquidation_price, recommend_mode,
        to_real, ExecutionMode, HealthFactor, RiskError, RiskTier,
    },
};
use std::collections::HashMap;

const WAD: u64 = 1_000_000_000_000_000_000;
const USDC: u64 = 1_000_000;

fn weth() -> AssetRiskInfo {
    AssetRiskInfo {
        offset: 0,
        asset: Address::repeat_byte(0x11),
        price_feed: Address::repeat_byte(0xf1),
        scale: WAD,
        borrow_collateral_factor: WAD / 10 * 8,
        liquidate_collateral_factor: WAD / 100 * 85,
        liquidation_factor: WAD / 100 * 90,
        supply_cap: 0,
    }
}

fn wbtc() -> AssetRiskInfo {
    AssetRiskInfo {
        offset: 1,
        asset: Address::repeat_byte(0x22),
        price_feed: Address::repeat_byte(0xf2),
        scale: 100_000_000,
        borrow_collateral_factor: WAD / 100 * 70,
        liquidate_collateral_factor: WAD / 100 * 77,
        liquidation_factor: WAD / 100 * 95,
        supply_cap: 0,
    }
}

/// 2 WETH at $2,500 with an 80% borrow collateral factor.
fn scenario_inputs() -> (CollateralBalances, RiskInfoMap, PriceMap) {
    let info = weth();
    let asset = info.asset;
    (
        HashMap::from([(asset, U256::from(2u128 * WAD as u128))]),
        HashMap::from([(asset, info)]),
        HashMap::from([(asset, 2_500.0)]),
    )
}

fn usdc(amount: u64) -> U256 {
    U256::from(amount * USDC)
}

#[test]
fn test_scenario_a_healthy_position_goes_direct() {
    let (balances, risk_info, prices) = scenario_inputs();
    let snapshot = compute_position(&balances, &risk_info, &prices, usdc(2_000), WAD).unwrap();

    assert!((snapshot.total_collateral_value - 5_000.0).abs() < 1e-9);
    assert!((snapshot.borrow_capacity - 4_000.0).abs() < 1e-9);
    assert!((snapshot.total_borrow_value - 2_000.0).abs() < 1e-9);
    let hf = snapshot.health_factor.value().unwrap();
    assert!((hf - 2.0).abs() < 1e-9);

    let recommendation = recommend_mode(snapshot.health_factor);
    assert_eq!(recommendation.mode, ExecutionMode::Direct);
    assert_eq!(recommendation.tier, RiskTier::Safe);
}

#[test]
fn test_scenario_b_thin_position_goes_flash() {
    let (balances, risk_info, prices) = scenario_inputs();
    let snapshot = compute_position(&balances, &risk_info, &prices, usdc(3_500), WAD).unwrap();

    let hf = snapshot.health_factor.value().unwrap();
    assert!((hf - 4_000.0 / 3_500.0).abs() < 1e-9);
    assert!((hf - 1.1429).abs() < 1e-4);

    let recommendation = recommend_mode(snapshot.health_factor);
    assert_eq!(recommendation.mode, ExecutionMode::Flash);
    assert_eq!(recommendation.tier, RiskTier::AtRisk);
}

#[test]
fn test_scenario_c_no_debt_is_safe_regardless_of_collateral() {
    let (balances, risk_info, prices) = scenario_inputs();
    let with_collateral = compute_position(&balances, &risk_info, &prices, U256::ZERO, WAD).unwrap();
    assert_eq!(with_collateral.health_factor, HealthFactor::Infinite);

    let without_collateral =
        compute_position(&HashMap::new(), &risk_info, &prices, U256::ZERO, WAD).unwrap();
    assert_eq!(without_collateral.health_factor, HealthFactor::NotApplicable);
    assert_eq!(without_collateral.total_collateral_value, 0.0);
    assert!(without_collateral.assets.is_empty());

    for snapshot in [with_collateral, without_collateral] {
        let recommendation = recommend_mode(snapshot.health_factor);
        assert_eq!(recommendation.mode, ExecutionMode::Direct);
        assert_eq!(recommendation.tier, RiskTier::Safe);
    }
}

#[test]
fn test_zero_capacity_with_debt_floors_at_zero() {
    let (balances, risk_info, _) = scenario_inputs();
    let snapshot = compute_position(&balances, &risk_info, &HashMap::new(), usdc(100), WAD).unwrap();

    assert_eq!(snapshot.borrow_capacity, 0.0);
    assert_eq!(snapshot.health_factor, HealthFactor::Value(0.0));
    assert_eq!(recommend_mode(snapshot.health_factor).tier, RiskTier::AtRisk);
}

#[test]
fn test_zero_collateral_liquidation_price() {
    let price = liquidation_price(U256::ZERO, &weth(), usdc(1_000), WAD).unwrap();
    assert_eq!(price, 0.0);

    let mut no_liquidation_factor = weth();
    no_liquidation_factor.liquidation_factor = 0;
    let price =
        liquidation_price(U256::from(WAD), &no_liquidation_factor, usdc(1_000), WAD).unwrap();
    assert_eq!(price, 0.0);
}

#[test]
fn test_liquidation_price_of_scenario_position() {
    let price = liquidation_price(U256::from(2u128 * WAD as u128), &weth(), usdc(2_000), WAD).unwrap();
    // 2000 / (2 * 0.9)
    assert!((price - 1_111.111_111).abs() < 1e-5);
}

#[test]
fn test_policy_boundaries() {
    let tier = |hf: f64| recommend_mode(HealthFactor::Value(hf)).tier;
    assert_eq!(tier(1.2), RiskTier::Caution);
    assert_eq!(tier(1.1999), RiskTier::AtRisk);
    assert_eq!(tier(1.4999), RiskTier::Caution);
    assert_eq!(tier(1.5), RiskTier::Safe);
    assert_eq!(tier(0.0), RiskTier::AtRisk);

    assert_eq!(recommend_mode(HealthFactor::Value(1.2)).mode, ExecutionMode::Flash);
    assert_eq!(recommend_mode(HealthFactor::Value(1.5)).mode, ExecutionMode::Direct);
    assert_eq!(recommend_mode(HealthFactor::Infinite).mode, ExecutionMode::Direct);
    assert_eq!(recommend_mode(HealthFactor::NotApplicable).mode, ExecutionMode::Direct);
}

#[test]
fn test_multi_asset_position() {
    let eth = weth();
    let btc = wbtc();
    let balances = HashMap::from([
        (eth.asset, U256::from(WAD)),
        (btc.asset, U256::from(50_000_000u64)),
    ]);
    let prices = HashMap::from([(eth.asset, 3_000.0), (btc.asset, 60_000.0)]);
    let risk_info = HashMap::from([(eth.asset, eth.clone()), (btc.asset, btc.clone())]);

    let snapshot = compute_position(&balances, &risk_info, &prices, usdc(10_000), WAD).unwrap();

    // 3000 + 0.5 * 60000
    assert!((snapshot.total_collateral_value - 33_000.0).abs() < 1e-6);
    // 3000 * 0.8 + 30000 * 0.7
    assert!((snapshot.borrow_capacity - 23_400.0).abs() < 1e-6);
    assert!((snapshot.health_factor.value().unwrap() - 2.34).abs() < 1e-9);

    assert_eq!(snapshot.assets.len(), 2);
    assert_eq!(snapshot.assets[0].asset, eth.asset);
    assert_eq!(snapshot.assets[1].asset, btc.asset);

    let single = borrow_capacity(U256::from(50_000_000u64), &btc, 60_000.0, WAD).unwrap();
    assert!((single - 21_000.0).abs() < 1e-6);

    let params = MarketRiskParameters::new(WAD, vec![eth.clone(), btc.clone()]);
    let btc_liquidation = snapshot.liquidation_price_for(&btc.asset, &params).unwrap().unwrap();
    // 10000 / (0.5 * 0.95)
    assert!((btc_liquidation - 21_052.631_578).abs() < 1e-4);
    assert_eq!(
        snapshot.liquidation_price_for(&Address::repeat_byte(0x99), &params).unwrap(),
        None
    );
}

#[test]
fn test_contract_violations() {
    let (balances, risk_info, prices) = scenario_inputs();
    assert_eq!(
        compute_position(&balances, &risk_info, &prices, usdc(1), 0),
        Err(RiskError::InvalidFactorScale { factor_scale: 0 })
    );

    let mut negative = prices.clone();
    negative.insert(weth().asset, -1.0);
    assert!(matches!(
        compute_position(&balances, &risk_info, &negative, usdc(1), WAD),
        Err(RiskError::InvalidPrice { .. })
    ));

    assert_eq!(to_real(U256::from(1u64), 0), Err(RiskError::InvalidScale { scale: 0 }));
}

#[test]
fn test_base_conversion_ignores_asset_scale() {
    assert_eq!(base_to_real(usdc(2_000)).unwrap(), 2_000.0);
    assert!((base_to_real(U256::from(1_234_567u64)).unwrap() - 1.234_567).abs() < 1e-12);
}
