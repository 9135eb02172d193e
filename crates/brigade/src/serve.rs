// SPDX-FileCopyrightText: 2026 Brigade Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `brigade serve` command implementation.
//!
//! Starts the broadcast hub server and runs it until SIGINT or SIGTERM,
//! then drains in-flight requests and exits.

use std::sync::Arc;

use brigade_config::model::BrigadeConfig;
use brigade_core::BrigadeError;
use brigade_hub::{BroadcastHub, HubState, ServerConfig, start_server};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Runs the `brigade serve` command.
pub async fn run_serve(config: BrigadeConfig) -> Result<(), BrigadeError> {
    init_tracing(&config.service.log_level);

    info!(service = %config.service.name, "starting brigade serve");

    let hub = Arc::new(BroadcastHub::new(config.hub.queue_capacity));
    let state = HubState { hub };
    let server_config = ServerConfig {
        host: config.hub.host.clone(),
        port: config.hub.port,
    };

    let shutdown = install_signal_handler();
    start_server(&server_config, state, shutdown).await?;

    info!("brigade serve stopped");
    Ok(())
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal is
/// received.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("brigade={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
