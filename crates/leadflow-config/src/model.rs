// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the leadflow pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level leadflow configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section has defaults; values without a sensible
/// default (`owner_base`, bucket names) are enforced by validation instead.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadflowConfig {
    /// Owner lookup and merge behavior.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Object store backend and bucket names.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound notification settings.
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Secret resolver backend.
    #[serde(default)]
    pub secrets: SecretsConfig,

    /// Delivery queue settings (`leadflow serve`).
    #[serde(default)]
    pub queue: QueueConfig,

    /// Prometheus exporter settings.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Owner lookup and merge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnrichmentConfig {
    /// Bypass the owner directory entirely (`owner_lookup_status = "skipped"`).
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub skip_owner_lookup: bool,

    /// Base URL of the owner directory; lookups hit `<owner_base>/<lead_id>.json`.
    #[serde(default)]
    pub owner_base: Option<String>,

    /// Extra attempts after the first for transient or unknown failures.
    #[serde(default = "default_retry_transient")]
    pub retry_transient: u32,

    /// Per-request timeout for directory calls.
    #[serde(default = "default_timeout_secs")]
    pub lookup_timeout_secs: u64,

    /// Fixed part of the sleep between attempts.
    #[serde(default = "default_backoff_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound of the random part of the sleep between attempts.
    #[serde(default = "default_backoff_ms")]
    pub backoff_jitter_ms: u64,

    /// Also write a curated artifact (status `permanent_failed`) when the
    /// lookup fails permanently.
    #[serde(default)]
    pub curate_on_permanent_failure: bool,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            skip_owner_lookup: false,
            owner_base: None,
            retry_transient: default_retry_transient(),
            lookup_timeout_secs: default_timeout_secs(),
            backoff_base_ms: default_backoff_ms(),
            backoff_jitter_ms: default_backoff_ms(),
            curate_on_permanent_failure: false,
        }
    }
}

impl EnrichmentConfig {
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

fn default_retry_transient() -> u32 {
    2
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_backoff_ms() -> u64 {
    400
}

/// Which object store implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Buckets are directories under `storage.root`.
    #[default]
    Filesystem,
    /// Amazon S3 (or a compatible endpoint).
    S3,
}

/// Object store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the filesystem backend.
    #[serde(default = "default_storage_root")]
    pub root: String,

    /// Bucket that receives raw webhook payloads (`leadflow ingest`).
    #[serde(default)]
    pub raw_bucket: Option<String>,

    /// Bucket for curated lead artifacts.
    #[serde(default)]
    pub curated_bucket: Option<String>,

    /// Bucket for error artifacts.
    #[serde(default)]
    pub error_bucket: Option<String>,

    /// AWS region override for the S3 backend.
    #[serde(default)]
    pub region: Option<String>,

    /// Endpoint override (e.g. LocalStack, MinIO).
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Upper bound for any single store operation.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_storage_root(),
            raw_bucket: None,
            curated_bucket: None,
            error_bucket: None,
            region: None,
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StorageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_storage_root() -> String {
    dirs::data_dir()
        .map(|p| p.join("leadflow").join("objects"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "leadflow-objects".to_string())
}

/// Outbound notification configuration.
///
/// With neither `secret_name` nor `webhook_url` set, notifications are off.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    /// Name of the secret holding the webhook URL.
    #[serde(default)]
    pub secret_name: Option<String>,

    /// Webhook URL given directly; takes precedence over `secret_name`.
    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            secret_name: None,
            webhook_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl NotifyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Which secret resolver implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretsBackend {
    /// Secret names are environment variable names.
    #[default]
    Env,
    /// AWS Secrets Manager.
    Aws,
}

/// Secret resolver configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecretsConfig {
    #[serde(default)]
    pub backend: SecretsBackend,

    #[serde(default)]
    pub region: Option<String>,
}

/// Delivery queue configuration.
///
/// `max_receive_count` mirrors the redrive policy configured on the queue
/// itself: after that many unacknowledged receives the queue moves the
/// message to its dead-letter target. The engine never enforces it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    #[serde(default)]
    pub queue_url: Option<String>,

    #[serde(default = "default_max_receive_count")]
    pub max_receive_count: u32,

    /// Long-poll duration for each receive call.
    #[serde(default = "default_wait_time_secs")]
    pub wait_time_secs: u32,

    /// Messages fetched per receive call.
    #[serde(default = "default_max_messages")]
    pub max_messages: u32,

    /// Visibility timeout requested on receive; `None` keeps the queue default.
    #[serde(default)]
    pub visibility_timeout_secs: Option<u32>,

    /// Pause after a failed receive before polling again.
    #[serde(default = "default_idle_backoff_ms")]
    pub idle_backoff_ms: u64,

    /// Client-side bound on one receive call. Must outlast the long poll;
    /// defaults to `wait_time_secs` plus [`RECEIVE_TIMEOUT_MARGIN_SECS`].
    #[serde(default)]
    pub receive_timeout_secs: Option<u64>,
}

/// Slack added on top of the long poll when no receive timeout is set.
pub const RECEIVE_TIMEOUT_MARGIN_SECS: u64 = 10;

impl QueueConfig {
    /// Operation timeout for queue calls, always longer than the long poll.
    pub fn receive_timeout(&self) -> Duration {
        let secs = self
            .receive_timeout_secs
            .unwrap_or(u64::from(self.wait_time_secs) + RECEIVE_TIMEOUT_MARGIN_SECS);
        Duration::from_secs(secs)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_url: None,
            max_receive_count: default_max_receive_count(),
            wait_time_secs: default_wait_time_secs(),
            max_messages: default_max_messages(),
            visibility_timeout_secs: None,
            idle_backoff_ms: default_idle_backoff_ms(),
            receive_timeout_secs: None,
        }
    }
}

fn default_max_receive_count() -> u32 {
    5
}

fn default_wait_time_secs() -> u32 {
    20
}

fn default_max_messages() -> u32 {
    10
}

fn default_idle_backoff_ms() -> u64 {
    1000
}

/// Prometheus exporter configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Socket address for the `/metrics` listener; `None` disables it.
    #[serde(default)]
    pub listen_addr: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Accepts a bool or a string; only `true` (any case) is true.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
        Number(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => s.trim().eq_ignore_ascii_case("true"),
        Flag::Number(_) => false,
    })
}
