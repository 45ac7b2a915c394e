// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue consumer loop.
//!
//! Deliveries are handled one at a time. A delivery is acknowledged only when
//! the engine returns `Ok`; otherwise it is released and the queue redelivers
//! it until its own receive ceiling moves it to the dead-letter target.

use std::sync::Arc;
use std::time::Duration;

use leadflow_config::model::QueueConfig;
use leadflow_core::{Delivery, LeadflowError, MessageSource};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::EnrichmentEngine;

/// Counters for one worker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub received: u64,
    pub acked: u64,
    pub released: u64,
    /// Deliveries handled successfully whose acknowledgement failed. They will
    /// be redelivered and reprocessed.
    pub ack_failures: u64,
}

impl WorkerStats {
    fn add(&mut self, other: WorkerStats) {
        self.received += other.received;
        self.acked += other.acked;
        self.released += other.released;
        self.ack_failures += other.ack_failures;
    }
}

/// Feeds deliveries from a [`MessageSource`] through the engine.
pub struct QueueWorker {
    source: Arc<dyn MessageSource>,
    engine: Arc<EnrichmentEngine>,
    /// The queue's dead-letter ceiling; only used for logging.
    max_receive_count: u32,
    idle_backoff: Duration,
}

impl QueueWorker {
    pub fn new(
        source: Arc<dyn MessageSource>,
        engine: Arc<EnrichmentEngine>,
        max_receive_count: u32,
        idle_backoff: Duration,
    ) -> Self {
        Self {
            source,
            engine,
            max_receive_count,
            idle_backoff,
        }
    }

    pub fn from_config(
        source: Arc<dyn MessageSource>,
        engine: Arc<EnrichmentEngine>,
        config: &QueueConfig,
    ) -> Self {
        Self::new(
            source,
            engine,
            config.max_receive_count,
            Duration::from_millis(config.idle_backoff_ms),
        )
    }

    /// Polls until `cancel` fires.
    ///
    /// A delivery already in progress is finished before the loop exits.
    /// Receive errors are logged and retried after the idle backoff.
    pub async fn run(&self, cancel: CancellationToken) -> WorkerStats {
        info!(source = self.source.name(), "queue worker running");
        let mut stats = WorkerStats::default();

        loop {
            let batch = tokio::select! {
                batch = self.source.receive() => batch,
                _ = cancel.cancelled() => break,
            };

            match batch {
                Ok(deliveries) => {
                    stats.add(self.handle_batch(deliveries, &cancel).await);
                }
                Err(e) => {
                    error!(error = %e, "receive failed");
                    tokio::select! {
                        _ = tokio::time::sleep(self.idle_backoff) => {}
                        _ = cancel.cancelled() => break,
                    }
                }
            }

            if cancel.is_cancelled() {
                break;
            }
        }

        info!(
            received = stats.received,
            acked = stats.acked,
            released = stats.released,
            "queue worker stopped"
        );
        stats
    }

    /// Receives and handles a single batch.
    pub async fn poll_once(&self) -> Result<WorkerStats, LeadflowError> {
        let deliveries = self.source.receive().await?;
        Ok(self
            .handle_batch(deliveries, &CancellationToken::new())
            .await)
    }

    async fn handle_batch(
        &self,
        deliveries: Vec<Delivery>,
        cancel: &CancellationToken,
    ) -> WorkerStats {
        let mut stats = WorkerStats::default();
        for delivery in deliveries {
            stats.received += 1;
            if cancel.is_cancelled() {
                // Untouched deliveries become visible again on their own.
                self.release(&delivery).await;
                stats.released += 1;
                continue;
            }
            stats.add(self.handle_delivery(&delivery).await);
        }
        stats
    }

    #[tracing::instrument(level = "debug", skip_all, fields(message_id = %delivery.message_id, receive_count = delivery.receive_count))]
    async fn handle_delivery(&self, delivery: &Delivery) -> WorkerStats {
        let mut stats = WorkerStats::default();
        match self.engine.handle_message(&delivery.body).await {
            Ok(report) => {
                debug!(objects = report.objects.len(), "acknowledging delivery");
                match self.source.ack(delivery).await {
                    Ok(()) => stats.acked += 1,
                    Err(e) => {
                        error!(error = %e, "ack failed; delivery will be reprocessed");
                        stats.ack_failures += 1;
                    }
                }
            }
            Err(e) => {
                if !e.is_redeliverable() {
                    warn!(
                        error = %e,
                        receive_count = delivery.receive_count,
                        "delivery cannot succeed on redelivery; it will be dead-lettered"
                    );
                } else if delivery.receive_count >= self.max_receive_count {
                    warn!(
                        error = %e,
                        max_receive_count = self.max_receive_count,
                        "delivery reached the receive ceiling; the queue will dead-letter it"
                    );
                }
                self.release(delivery).await;
                stats.released += 1;
            }
        }
        stats
    }

    async fn release(&self, delivery: &Delivery) {
        if let Err(e) = self.source.release(delivery).await {
            debug!(error = %e, "release failed; visibility timeout will expire instead");
        }
    }
}
