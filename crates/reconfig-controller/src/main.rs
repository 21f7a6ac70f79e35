//! Reconfiguration controller binary

use anyhow::Context;
use clap::Parser;
use reconfig::CancelToken;
use reconfig_controller::{Cli, Config, Controller, LogFormat};
use tokio::signal::unix::{SignalKind, signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Can't use tracing yet - not initialized
    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config);

    let level = config.logging.level.as_deref().unwrap_or("info");
    match config.logging.format.unwrap_or(LogFormat::Text) {
        LogFormat::Text => common::logging::init(level),
        LogFormat::Json => common::logging::init_json(level),
    }

    tracing::info!("Reconfiguration controller starting");

    let controller = Controller::prepare(config).context("controller setup failed")?;

    if cli.check {
        controller.log_plan();
        tracing::info!("Configuration check complete");
        return Ok(());
    }

    let cancel = CancelToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    // The cycle is strictly sequential and blocking
    tokio::task::spawn_blocking(move || controller.run(cancel))
        .await
        .context("reconfiguration loop panicked")?
        .context("reconfiguration loop failed")?;

    tracing::info!("Reconfiguration controller stopped");
    Ok(())
}

/// Cancel the loop on SIGINT or SIGTERM
async fn shutdown_on_signal(cancel: CancelToken) {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            cancel.cancel();
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT"),
        _ = terminate.recv() => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Stopping after the current phase");
    cancel.cancel();
}
