// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadflow serve` command implementation.
//!
//! Builds the configured collaborators, optionally exposes Prometheus
//! metrics, and runs the queue worker until SIGINT or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use leadflow_config::LeadflowConfig;
use leadflow_core::LeadflowError;
use leadflow_engine::QueueWorker;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::adapters::AdapterFactory;

/// Runs the `leadflow serve` command.
pub async fn run_serve(config: LeadflowConfig) -> Result<(), LeadflowError> {
    info!(version = env!("CARGO_PKG_VERSION"), "starting leadflow serve");

    install_metrics(config.metrics.listen_addr.as_deref())?;

    let factory = AdapterFactory::new(config);
    let store = factory.object_store().await?;
    let engine = Arc::new(factory.engine(store).await?);
    let source = factory.message_source().await?;
    let worker = QueueWorker::from_config(source, engine, &factory.config().queue);

    let cancel = install_signal_handler();
    let stats = worker.run(cancel).await;

    info!(
        received = stats.received,
        acked = stats.acked,
        released = stats.released,
        ack_failures = stats.ack_failures,
        "leadflow serve stopped"
    );
    Ok(())
}

fn install_metrics(listen_addr: Option<&str>) -> Result<(), LeadflowError> {
    let Some(addr) = listen_addr else {
        debug!("metrics listener disabled by configuration");
        return Ok(());
    };
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| LeadflowError::Config(format!("invalid metrics.listen_addr {addr}: {e}")))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| LeadflowError::Config(format!("failed to start metrics listener: {e}")))?;
    leadflow_engine::recording::register_metrics();
    info!(%addr, "prometheus metrics listening");
    Ok(())
}

/// Returns a token cancelled on SIGINT or SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        trigger.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}
