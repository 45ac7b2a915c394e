// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook notifier: one JSON POST per enriched lead.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leadflow_config::model::NotifyConfig;
use leadflow_core::{
    AdapterType, EnrichedLead, HealthStatus, LeadflowError, Notifier, NotifyReceipt,
    PluginAdapter, SecretResolver,
};
use secrecy::ExposeSecret;
use tracing::debug;

use crate::message::summary_message;
use crate::target::WebhookTarget;

/// Response bodies are kept up to this many characters in error messages.
const MAX_LOGGED_BODY: usize = 200;

/// Posts [`summary_message`] payloads to a webhook.
#[derive(Debug)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    target: WebhookTarget,
}

impl WebhookNotifier {
    pub fn new(target: WebhookTarget, timeout: Duration) -> Result<Self, LeadflowError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| LeadflowError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, target })
    }

    /// Builds the notifier described by the `[notify]` section.
    ///
    /// The resolver is only consulted when `secret_name` is the sole source.
    pub fn from_config(
        config: &NotifyConfig,
        resolver: Arc<dyn SecretResolver>,
    ) -> Result<Self, LeadflowError> {
        let target = WebhookTarget::from_parts(
            config.webhook_url.as_deref(),
            config.secret_name.as_deref(),
            resolver,
        );
        Self::new(target, config.timeout())
    }

    pub fn target(&self) -> &WebhookTarget {
        &self.target
    }
}

fn notify_error(message: String, source: Option<reqwest::Error>) -> LeadflowError {
    LeadflowError::Notify {
        message,
        source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
    }
}

#[async_trait]
impl PluginAdapter for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    /// Checks that the target resolves; never posts.
    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        match self.target.resolve().await {
            Ok(Some(_)) => Ok(HealthStatus::Healthy),
            Ok(None) => Ok(HealthStatus::Degraded("notifications disabled".into())),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[tracing::instrument(level = "debug", skip_all, fields(lead_id = %lead.lead_id))]
    async fn notify(&self, lead: &EnrichedLead) -> Result<NotifyReceipt, LeadflowError> {
        let Some(url) = self.target.resolve().await? else {
            debug!("no webhook configured, skipping notification");
            return Ok(NotifyReceipt::Disabled);
        };

        let response = self
            .client
            .post(url.expose_secret())
            .json(&summary_message(lead))
            .send()
            .await
            .map_err(|e| {
                // The URL embeds the webhook credential; keep it out of messages.
                let e = e.without_url();
                notify_error(format!("webhook request failed: {e}"), Some(e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_LOGGED_BODY).collect();
            return Err(notify_error(
                format!("webhook returned {status}: {body}"),
                None,
            ));
        }

        debug!(status = status.as_u16(), "notification delivered");
        Ok(NotifyReceipt::Delivered {
            status: status.as_u16(),
        })
    }
}
