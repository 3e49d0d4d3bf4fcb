//! Batch Simulation
//!
//! Runs a fixed number of unpaced ticks through the full pipeline and
//! reports how the verdicts are distributed.
//!
//! Usage: batch-simulate [count] [seed] [format: none|json|table] [config path]

use anyhow::{Context, Result};
use fraud_stream_monitor::{
    config::{AppConfig, PresenterFormat, DEFAULT_CONFIG_PATH},
    driver::Driver,
    generator::RandomTransactionGenerator,
    logging, presenter,
    types::TransactionType,
};
use tokio::sync::watch;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let count: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(1000);
    let seed: Option<u64> = args.get(2).and_then(|s| s.parse().ok());
    let format = match args.get(3).map(|s| s.as_str()) {
        Some("json") => PresenterFormat::Json,
        Some("table") => PresenterFormat::Table,
        _ => PresenterFormat::None,
    };
    let config_path = args.get(4).map(|s| s.as_str()).unwrap_or(DEFAULT_CONFIG_PATH);

    let mut config = AppConfig::load_from_path(config_path)?;
    config.simulation.tick_interval_ms = 0;
    config.simulation.max_ticks = Some(count);
    config.presentation.format = format;
    if seed.is_some() {
        config.simulation.seed = seed;
        config.model.seed = seed;
    }

    logging::init(&config.logging, &["fraud_stream_monitor", "batch_simulate"])?;
    info!(
        count = count,
        seed = ?seed,
        format = ?format,
        config_path = %config_path,
        "Starting batch simulation"
    );

    let source = RandomTransactionGenerator::from_config(&config.simulation);
    let presenter = presenter::from_config(&config.presentation);
    let mut driver =
        Driver::from_config(&config, source, presenter).context("Failed to initialize the pipeline")?;

    // The sender stays alive until the run returns
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let summary = driver.run(shutdown_rx).await.context("Batch run aborted")?;

    let history = driver.history();
    for transaction_type in TransactionType::ALL {
        let total = history.filter(|e| e.transaction_type == transaction_type).count();
        let flagged = history
            .filter(|e| e.transaction_type == transaction_type && e.is_fraudulent())
            .count();
        info!(
            transaction_type = %transaction_type,
            total = total,
            fraudulent = flagged,
            "Verdicts by transaction type"
        );
    }

    if let Some(first) = history.iter().find(|e| e.is_fraudulent()) {
        info!("Sample fraudulent transaction:\n{}", serde_json::to_string_pretty(first)?);
    }

    driver.metrics().print_summary();
    info!(
        ticks = summary.ticks,
        transactions = summary.transactions,
        fraudulent = summary.fraudulent,
        "Completed!"
    );

    Ok(())
}
