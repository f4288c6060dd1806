use anyhow::Result;
use clap::Parser;
use tracing::info;

mod bridge;
mod cache;
mod commitment;
mod config;
mod durable;
mod feed;
mod gateway;
mod keys;
mod proofs;
mod redemption;
mod telemetry;
mod traits;
mod types;

use bridge::AshBridge;
use config::BaseConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize telemetry
    telemetry::init();
    info!("Starting ashbridge");

    // Parse configuration from CLI arguments
    let config = BaseConfig::parse();
    info!(
        "Configuration: storage_path={}, epoch_interval_secs={}, redemption_rate={}",
        config.storage_path, config.epoch_interval_secs, config.redemption_rate
    );

    let run_diagnose = config.diagnose;
    let run_repair = config.repair;

    // Initialize the app
    let app = AshBridge::initialize(config).await?;

    // One-shot operational surfaces, then exit
    if run_diagnose {
        let report = app.diagnose().await;
        info!(
            "Proof store diagnosis: {} entries ({} sampled), {} attributable keys, {} well-formed proofs, {} corrupt",
            report.total_entries,
            report.sampled,
            report.attributable_keys,
            report.well_formed_proofs,
            report.corrupt_entries
        );
        return Ok(());
    }
    if run_repair {
        let touched = app.repair().await;
        info!("Proof store repair complete: {} entries rewritten or dropped", touched);
        return Ok(());
    }

    app.run().await?;

    info!("Ashbridge shutdown complete");
    Ok(())
}
