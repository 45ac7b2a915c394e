// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the owner directory.

use std::time::Duration;

use async_trait::async_trait;
use leadflow_core::{
    AdapterType, HealthStatus, LeadflowError, LookupError, OwnerDirectory, OwnerRecord,
    PluginAdapter,
};
use reqwest::Url;
use tracing::debug;

/// Error bodies longer than this are truncated before they are kept.
const MAX_ERROR_BODY: usize = 512;

/// Owner directory reached over plain HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpOwnerDirectory {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl HttpOwnerDirectory {
    /// Creates a client for `base`, bounding every request by `timeout`.
    pub fn new(base: &str, timeout: Duration) -> Result<Self, LeadflowError> {
        let base = Url::parse(base)
            .map_err(|e| LeadflowError::Config(format!("invalid owner directory URL {base}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(LeadflowError::Config(format!(
                "owner directory URL cannot carry a path: {base}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| LeadflowError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    /// `<base>/<lead_id>.json`, with the id escaped as a single segment.
    pub fn lookup_url(&self, lead_id: &str) -> Result<Url, LookupError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| LookupError::Other {
                message: format!("owner directory URL cannot carry a path: {}", self.base),
            })?
            .pop_if_empty()
            .push(&format!("{lead_id}.json"));
        Ok(url)
    }

    fn transport_error(&self, e: reqwest::Error) -> LookupError {
        if e.is_timeout() {
            LookupError::Timeout {
                after: self.timeout,
            }
        } else if e.is_connect() {
            LookupError::Connect {
                message: e.to_string(),
            }
        } else if e.is_decode() || e.is_body() {
            LookupError::Decode {
                message: e.to_string(),
            }
        } else {
            LookupError::Other {
                message: e.to_string(),
            }
        }
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

#[async_trait]
impl PluginAdapter for HttpOwnerDirectory {
    fn name(&self) -> &str {
        "http-owner-directory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Directory
    }

    /// Any HTTP answer from the base URL counts as reachable.
    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        match self.client.head(self.base.clone()).send().await {
            Ok(response) if response.status().is_server_error() => Ok(HealthStatus::Degraded(
                format!("owner directory returned {}", response.status()),
            )),
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl OwnerDirectory for HttpOwnerDirectory {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn lookup(&self, lead_id: &str) -> Result<OwnerRecord, LookupError> {
        let url = self.lookup_url(lead_id)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        debug!(status = %status, "owner directory responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| LookupError::Decode {
                message: e.to_string(),
            })?;
        Ok(OwnerRecord::from_value(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(base: &str) -> HttpOwnerDirectory {
        HttpOwnerDirectory::new(base, Duration::from_secs(5)).expect("valid base")
    }

    #[test]
    fn lookup_url_appends_json_file() {
        let dir = directory("https://owners.example.com/api/leads");
        assert_eq!(
            dir.lookup_url("L1").expect("url").as_str(),
            "https://owners.example.com/api/leads/L1.json"
        );
    }

    #[test]
    fn lookup_url_tolerates_trailing_slash() {
        let dir = directory("https://owners.example.com/leads/");
        assert_eq!(
            dir.lookup_url("L1").expect("url").as_str(),
            "https://owners.example.com/leads/L1.json"
        );
    }

    #[test]
    fn lookup_url_escapes_id() {
        let dir = directory("https://owners.example.com");
        assert_eq!(
            dir.lookup_url("a/b c").expect("url").as_str(),
            "https://owners.example.com/a%2Fb%20c.json"
        );
    }

    #[test]
    fn rejects_unusable_base() {
        assert!(HttpOwnerDirectory::new("not a url", Duration::from_secs(5)).is_err());
        assert!(HttpOwnerDirectory::new("mailto:x@example.com", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "é".repeat(400);
        let cut = truncate(body);
        assert!(cut.len() <= MAX_ERROR_BODY);
        assert!(cut.chars().all(|c| c == 'é'));
    }
}
