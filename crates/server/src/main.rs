//! silencer: creates Alertmanager silences for recurring maintenance windows
//! and serves a status page describing them.

mod api;
mod cli;
mod router;
mod shutdown;
mod state;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use silencer_alertmanager::AlertmanagerClient;
use silencer_maintenance::{
    InMemoryActiveStore, MaintenanceConfig, MaintenanceOrchestrator, StatusBoard, SystemClock,
};

use crate::cli::Cli;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = MaintenanceConfig::load(&cli.config_file)
        .with_context(|| format!("failed to load {}", cli.config_file.display()))?;

    let gateway = AlertmanagerClient::new(&cli.alertmanager_url, cli.request_timeout())
        .context("invalid Alertmanager URL")?;
    info!(url = %cli.alertmanager_url, "using alertmanager");

    let orchestrator = Arc::new(MaintenanceOrchestrator::new(
        cli.service_name.clone(),
        config.maintenances,
        Arc::new(InMemoryActiveStore::new()),
        Arc::new(gateway),
        Arc::new(SystemClock),
    ));

    if let Err(e) = orchestrator.start().await {
        error!(error = %e, "failed to start maintenance orchestrator");
        return Err(e).context("failed to start maintenance orchestrator");
    }

    let state = Arc::new(AppState {
        orchestrator: orchestrator.clone(),
        board: StatusBoard::new(orchestrator.clone(), config.index),
    });
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    info!(addr = %cli.listen, "status page listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    info!(timeout = ?cli.shutdown_timeout(), "stopping maintenance orchestrator");
    if let Err(e) = orchestrator.stop(cli.shutdown_timeout()).await {
        warn!(error = %e, "orchestrator did not stop cleanly");
    }
    info!("silencer exited cleanly");

    Ok(())
}
