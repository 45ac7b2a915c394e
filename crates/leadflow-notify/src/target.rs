// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Where notifications go, and how the URL is found.

use std::sync::Arc;

use leadflow_core::{LeadflowError, SecretResolver};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

/// Keys checked, in order, when the secret holds a JSON object.
const URL_KEYS: &[&str] = &["url", "webhook", "SLACK_WEBHOOK_URL"];

/// Notification destination.
pub enum WebhookTarget {
    /// No destination configured; notifying is a no-op.
    Disabled,
    /// URL known up front.
    Url(SecretString),
    /// URL stored in a secret, fetched on first use.
    ///
    /// Only a successful resolution is cached; a failed one is retried on the
    /// next notification.
    Secret {
        resolver: Arc<dyn SecretResolver>,
        name: String,
        cache: OnceCell<SecretString>,
    },
}

impl std::fmt::Debug for WebhookTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Url(_) => f.write_str("Url([REDACTED])"),
            Self::Secret { name, cache, .. } => f
                .debug_struct("Secret")
                .field("name", name)
                .field("resolved", &cache.initialized())
                .finish(),
        }
    }
}

impl WebhookTarget {
    /// A direct URL wins over a secret reference; neither means disabled.
    pub fn from_parts(
        webhook_url: Option<&str>,
        secret_name: Option<&str>,
        resolver: Arc<dyn SecretResolver>,
    ) -> Self {
        match (webhook_url, secret_name) {
            (Some(url), _) => Self::Url(SecretString::from(url.to_string())),
            (None, Some(name)) => Self::Secret {
                resolver,
                name: name.to_string(),
                cache: OnceCell::new(),
            },
            (None, None) => Self::Disabled,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }

    /// Returns the webhook URL, or `None` when disabled.
    pub async fn resolve(&self) -> Result<Option<&SecretString>, LeadflowError> {
        match self {
            Self::Disabled => Ok(None),
            Self::Url(url) => Ok(Some(url)),
            Self::Secret {
                resolver,
                name,
                cache,
            } => {
                let url = cache
                    .get_or_try_init(|| async {
                        let raw = resolver.resolve(name).await?;
                        let url = parse_webhook_secret(raw.expose_secret()).ok_or_else(|| {
                            LeadflowError::Secret {
                                name: name.clone(),
                                message: "secret holds no webhook URL".into(),
                            }
                        })?;
                        debug!(secret = %name, "webhook URL resolved");
                        Ok::<_, LeadflowError>(SecretString::from(url))
                    })
                    .await?;
                Ok(Some(url))
            }
        }
    }
}

/// Extracts a webhook URL from a secret string.
///
/// Accepts a JSON object carrying one of `url`, `webhook` or
/// `SLACK_WEBHOOK_URL`, or the bare URL itself.
pub fn parse_webhook_secret(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.starts_with("https://") || raw.starts_with("http://") {
        return Some(raw.to_string());
    }

    let value: Value = serde_json::from_str(raw).ok()?;
    URL_KEYS
        .iter()
        .filter_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(String::from)
}
