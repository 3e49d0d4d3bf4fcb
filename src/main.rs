//! Fraud Stream Monitor - Main Entry Point
//!
//! Trains the reference model, then generates, scores and displays one
//! synthetic transaction per tick until interrupted.

use anyhow::{Context, Result};
use fraud_stream_monitor::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    driver::Driver,
    generator::RandomTransactionGenerator,
    logging, presenter,
};
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load_from_path(&config_path)?;

    logging::init(&config.logging, &["fraud_stream_monitor"])?;
    info!(path = %config_path, "Configuration loaded");
    info!(
        amount = ?(config.simulation.amount_min, config.simulation.amount_max),
        balance = ?(config.simulation.balance_min, config.simulation.balance_max),
        tick_interval_ms = config.simulation.tick_interval_ms,
        contamination = config.model.contamination,
        history_capacity = ?config.history.capacity,
        "Starting Fraud Stream Monitor"
    );

    info!("Initializing fraud detection model...");
    let source = RandomTransactionGenerator::from_config(&config.simulation);
    let presenter = presenter::from_config(&config.presentation);
    let mut driver =
        Driver::from_config(&config, source, presenter).context("Failed to initialize the pipeline")?;
    info!("Model initialized successfully");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, finishing current tick");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // Dropping the sender would stop the loop, so keep it alive
                warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        }
    });

    let result = driver.run(shutdown_rx).await;

    info!("Monitor shutting down...");
    driver.metrics().print_summary();

    let summary = result.context("Driver loop aborted")?;
    info!(
        ticks = summary.ticks,
        transactions = summary.transactions,
        fraudulent = summary.fraudulent,
        retained = summary.retained,
        "Run complete"
    );

    Ok(())
}
