// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes:
//! required values without defaults, URL shapes, and numeric bounds.

use crate::diagnostic::ConfigError;
use crate::model::{LeadflowConfig, SecretsBackend, StorageBackend};

/// Largest accepted local retry budget. The queue provides long-horizon retries.
pub const MAX_RETRY_TRANSIENT: u32 = 10;

/// Accepted range for every outbound timeout, in seconds.
const TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=60;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LeadflowConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let enrichment = &config.enrichment;
    match enrichment.owner_base.as_deref().map(str::trim) {
        None | Some("") if !enrichment.skip_owner_lookup => fail(
            "enrichment.owner_base is required unless enrichment.skip_owner_lookup is true"
                .to_string(),
        ),
        Some(base) if !base.is_empty() && !is_http_url(base) => fail(format!(
            "enrichment.owner_base `{base}` must be an http:// or https:// URL"
        )),
        _ => {}
    }

    if enrichment.retry_transient > MAX_RETRY_TRANSIENT {
        fail(format!(
            "enrichment.retry_transient must be at most {MAX_RETRY_TRANSIENT}, got {}",
            enrichment.retry_transient
        ));
    }

    for (name, secs) in [
        ("enrichment.lookup_timeout_secs", enrichment.lookup_timeout_secs),
        ("storage.timeout_secs", config.storage.timeout_secs),
        ("notify.timeout_secs", config.notify.timeout_secs),
    ] {
        if !TIMEOUT_RANGE.contains(&secs) {
            fail(format!(
                "{name} must be between {} and {} seconds, got {secs}",
                TIMEOUT_RANGE.start(),
                TIMEOUT_RANGE.end()
            ));
        }
    }

    for (name, bucket) in [
        ("storage.curated_bucket", &config.storage.curated_bucket),
        ("storage.error_bucket", &config.storage.error_bucket),
    ] {
        if bucket.as_deref().is_none_or(|b| b.trim().is_empty()) {
            fail(format!("{name} is required"));
        }
    }

    if config.storage.backend == StorageBackend::Filesystem && config.storage.root.trim().is_empty()
    {
        fail("storage.root must not be empty for the filesystem backend".to_string());
    }

    if config
        .notify
        .webhook_url
        .as_deref()
        .is_some_and(|url| !is_http_url(url.trim()))
    {
        fail("notify.webhook_url must be an http:// or https:// URL".to_string());
    }

    if config.secrets.backend == SecretsBackend::Env
        && config
            .notify
            .secret_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
    {
        fail("notify.secret_name must not be empty when set".to_string());
    }

    let queue = &config.queue;
    if queue.max_receive_count < 1 {
        fail("queue.max_receive_count must be at least 1".to_string());
    }
    if !(1..=10).contains(&queue.max_messages) {
        fail(format!(
            "queue.max_messages must be between 1 and 10, got {}",
            queue.max_messages
        ));
    }
    if queue.wait_time_secs > 20 {
        fail(format!(
            "queue.wait_time_secs must be at most 20, got {}",
            queue.wait_time_secs
        ));
    }
    if let Some(secs) = queue.receive_timeout_secs {
        if secs <= u64::from(queue.wait_time_secs) {
            fail(format!(
                "queue.receive_timeout_secs ({secs}) must exceed queue.wait_time_secs ({})",
                queue.wait_time_secs
            ));
        }
    }

    if let Some(addr) = config
        .metrics
        .listen_addr
        .as_deref()
        .filter(|addr| addr.parse::<std::net::SocketAddr>().is_err())
    {
        fail(format!(
            "metrics.listen_addr `{addr}` is not a valid socket address"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        value
            .strip_prefix(scheme)
            .is_some_and(|host| !host.is_empty() && !host.starts_with('/'))
    })
}
