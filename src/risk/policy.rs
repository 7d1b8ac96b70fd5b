// Swap path recommendation from the health factor
use serde::{Deserialize, Serialize};

use crate::risk::HealthFactor;

/// Below this health factor a position is at risk.
pub const AT_RISK_THRESHOLD: f64 = 1.2;
/// At or above this health factor a position is safe.
pub const SAFE_THRESHOLD: f64 = 1.5;

/// How the collateral swap withdraws the source asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Withdraw, swap and resupply in sequence.
    Direct,
    /// Borrow through a flash loan so the position is never
    /// under-collateralized mid-swap.
    Flash,
}

impl ExecutionMode {
    pub fn uses_flash_loan(&self) -> bool {
        matches!(self, ExecutionMode::Flash)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskTier {
    Safe,
    Caution,
    AtRisk,
}

impl RiskTier {
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Safe => "Safe",
            RiskTier::Caution => "Caution",
            RiskTier::AtRisk => "At Risk",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RiskTier::Safe => "Healthy position. Direct mode is safe.",
            RiskTier::Caution => "Moderate health factor. Consider flash mode for safety.",
            RiskTier::AtRisk => "Low health factor detected. Flash mode recommended.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeRecommendation {
    pub mode: ExecutionMode,
    pub tier: RiskTier,
}

/// Map a health factor to the recommended swap path and risk banner.
///
/// Advisory only: the caller may still let the user pick the other mode.
pub fn recommend_mode(health_factor: HealthFactor) -> ModeRecommendation {
    let tier = match health_factor {
        HealthFactor::Infinite | HealthFactor::NotApplicable => RiskTier::Safe,
        HealthFactor::Value(value) if value >= SAFE_THRESHOLD => RiskTier::Safe,
        HealthFactor::Value(value) if value >= AT_RISK_THRESHOLD => RiskTier::Caution,
        HealthFactor::Value(_) => RiskTier::AtRisk,
    };

    let mode = match tier {
        RiskTier::Safe => ExecutionMode::Direct,
        RiskTier::Caution | RiskTier::AtRisk => ExecutionMode::Flash,
    };

    ModeRecommendation { mode, tier }
}
