use alloy::primitives::Address;
use comet_collateral_swap::{
    adapters::compound_v3::CometReader,
    config::Settings,
    services::PositionService,
    utils::{format_health_factor, format_usd, init_tracing},
    AppError,
};
use std::sync::Arc;
use tracing::{error, info};

const ACCOUNT_ENV: &str = "COLLATERAL_SWAP_ACCOUNT";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Position report failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let settings = Settings::new()?;
    settings.validate()?;
    init_tracing(&settings.logging)?;

    let account = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(ACCOUNT_ENV).ok())
        .ok_or_else(|| {
            AppError::ValidationError(format!(
                "usage: position-report <account> (or set {})",
                ACCOUNT_ENV
            ))
        })?;
    let account: Address = account
        .parse()
        .map_err(|e| AppError::ValidationError(format!("Invalid account address {}: {}", account, e)))?;

    info!(
        rpc = %settings.rpc.url,
        market = %settings.market.comet_address,
        chain_id = settings.market.chain_id,
        router = ?settings.market.router_address,
        "Reading position"
    );

    let reader = CometReader::from_settings(&settings)?;
    let service = PositionService::new(Arc::new(reader)).with_router(settings.market.router_address);
    let report = service.refresh(account).await?;

    info!(
        health_factor = %format_health_factor(report.snapshot.health_factor),
        collateral = %format_usd(report.snapshot.total_collateral_value, 2),
        borrow = %format_usd(report.snapshot.total_borrow_value, 2),
        tier = report.recommendation.tier.label(),
        "{}",
        report.recommendation.tier.message()
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
