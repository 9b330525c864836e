mod domain;
mod clients;
mod clock;

mod app_system;

#[cfg(test)]
mod mock_framework;

mod actor_framework;
mod order_actor;
mod ticket_actor;
mod product_actor;
mod log_actor;

mod store;
mod locator;
mod receipt;
mod controller;
mod purchases;
mod http;

use clap::Parser;
use tracing::{error, info};

use crate::app_system::{setup_tracing, Cli, DownloadSettings, DownloadSystem};
use crate::http::HttpServer;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for ctrl-c");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing();

    let settings = DownloadSettings::try_from(cli)?;
    info!(bind_address = %settings.bind_address, public_base_url = %settings.public_base_url, "Starting download service");

    let system = DownloadSystem::new(&settings)?;
    let server = HttpServer::new(settings.bind_address, system.app_state());

    let served = server.run(shutdown_signal()).await;
    system.shutdown().await?;
    served?;

    info!("Download service stopped");
    Ok(())
}
