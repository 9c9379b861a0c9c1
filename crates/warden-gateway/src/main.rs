//! Warden gateway binary.
//!
//! Reads the config file named by `WARDEN_CONFIG` (defaults otherwise),
//! serves until Ctrl+C, then drains connections and stops the sweeper.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info};
use warden_gateway::{init_tracing, GatewayConfig, GatewayService};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var_os("WARDEN_CONFIG").map(PathBuf::from);
    let config =
        GatewayConfig::load(config_path.as_deref()).context("Failed to load gateway configuration")?;

    init_tracing(&config.log).context("Failed to initialize logging")?;

    info!("===========================================");
    info!("  Warden Gateway v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        ban_threshold = config.admission.ban_threshold,
        sweep_period_secs = config.admission.sweep_period.as_secs(),
        idle_ttl_secs = config.admission.idle_ttl.as_secs(),
        "Admission policy loaded"
    );

    let service = GatewayService::new(config).context("Failed to create gateway")?;
    service
        .run(GatewayService::default_api(), shutdown_signal())
        .await
        .context("Gateway stopped with an error")?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            // Without a signal handler only an external kill stops the process.
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}
