// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message source trait for at-least-once delivery queues.
//!
//! Redelivery and dead-lettering belong to the queue. The worker only
//! acknowledges deliveries whose processing succeeded; everything else is
//! released back for redelivery until the queue's receive-count ceiling
//! moves it to the dead-letter path.

use async_trait::async_trait;

use crate::error::LeadflowError;
use crate::traits::adapter::PluginAdapter;

/// One received queue message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Provider message identifier.
    pub message_id: String,
    /// Handle used to acknowledge this specific receipt.
    pub receipt: String,
    /// Raw message body.
    pub body: String,
    /// How many times the queue has handed this message out, including now.
    pub receive_count: u32,
}

#[async_trait]
pub trait MessageSource: PluginAdapter {
    /// Waits for and returns the next batch of deliveries (possibly empty).
    async fn receive(&self) -> Result<Vec<Delivery>, LeadflowError>;

    /// Acknowledges a delivery so it is never redelivered.
    async fn ack(&self, delivery: &Delivery) -> Result<(), LeadflowError>;

    /// Gives up on a delivery for now.
    ///
    /// Queues with visibility timeouts redeliver on their own, so the default
    /// does nothing.
    async fn release(&self, _delivery: &Delivery) -> Result<(), LeadflowError> {
        Ok(())
    }
}
