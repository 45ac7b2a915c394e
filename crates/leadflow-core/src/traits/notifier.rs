// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound notification trait.

use async_trait::async_trait;

use crate::error::LeadflowError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EnrichedLead, NotifyReceipt};

/// Best-effort announcement of an enrichment outcome.
///
/// Errors are informational: the engine logs and discards them.
#[async_trait]
pub trait Notifier: PluginAdapter {
    /// Sends one notification describing the lead.
    async fn notify(&self, lead: &EnrichedLead) -> Result<NotifyReceipt, LeadflowError>;
}
