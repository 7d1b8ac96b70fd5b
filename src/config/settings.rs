use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_SLIPPAGE_PCT;

/// Environment prefix, e.g. `COLLATERAL_SWAP__RPC__URL`.
pub const ENV_PREFIX: &str = "COLLATERAL_SWAP";
/// Optional settings file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config/default";

/// cUSDCv3 on Ethereum mainnet
pub const MAINNET_USDC_COMET: Address = address!("c3d688b66703497daa19211eedff47f25384cdc3");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rpc: RpcSettings,
    pub market: MarketSettings,
    pub swap: SwapSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    pub url: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub chain_id: u64,
    pub comet_address: Address,
    pub router_address: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapSettings {
    pub default_slippage_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for RpcSettings {
    fn default() -> Self {
        RpcSettings {
            url: "http://localhost:8545".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

impl Default for MarketSettings {
    fn default() -> Self {
        MarketSettings {
            chain_id: 1,
            comet_address: MAINNET_USDC_COMET,
            router_address: None,
        }
    }
}

impl Default for SwapSettings {
    fn default() -> Self {
        SwapSettings {
            default_slippage_pct: DEFAULT_SLIPPAGE_PCT,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Defaults, overlaid by `config/default.*` when present, overlaid by
    /// `COLLATERAL_SWAP__*` environment variables.
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load(DEFAULT_CONFIG_FILE)
    }

    pub fn load(config_file: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(config_file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
