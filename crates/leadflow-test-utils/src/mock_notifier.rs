// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier that records instead of sending.

use std::sync::Arc;

use async_trait::async_trait;
use leadflow_core::{
    AdapterType, EnrichedLead, HealthStatus, LeadflowError, Notifier, NotifyReceipt,
    PluginAdapter,
};
use tokio::sync::Mutex;

#[derive(Clone, Copy, Default)]
enum Behaviour {
    #[default]
    Deliver,
    Fail,
    Hang,
}

/// Records every lead it is asked to announce.
///
/// Failing and hanging notifiers still record the attempt first.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<EnrichedLead>>>,
    behaviour: Behaviour,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification fails after being recorded.
    pub fn failing() -> Self {
        Self {
            behaviour: Behaviour::Fail,
            ..Self::default()
        }
    }

    /// Every notification is recorded and then never completes.
    pub fn hanging() -> Self {
        Self {
            behaviour: Behaviour::Hang,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<EnrichedLead> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for RecordingNotifier {
    fn name(&self) -> &str {
        "recording-notifier"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, lead: &EnrichedLead) -> Result<NotifyReceipt, LeadflowError> {
        self.sent.lock().await.push(lead.clone());
        match self.behaviour {
            Behaviour::Deliver => Ok(NotifyReceipt::Delivered { status: 200 }),
            Behaviour::Fail => Err(LeadflowError::Notify {
                message: "webhook returned 500 Internal Server Error".into(),
                source: None,
            }),
            Behaviour::Hang => std::future::pending().await,
        }
    }
}
