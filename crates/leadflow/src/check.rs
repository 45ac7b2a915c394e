// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadflow check` command implementation.
//!
//! Configuration has already been validated by the time this runs; the
//! command then builds every collaborator and asks it for its health.

use std::time::{Duration, Instant};

use leadflow_config::LeadflowConfig;
use leadflow_core::{HealthStatus, LeadflowError, PluginAdapter};

use crate::adapters::AdapterFactory;

/// Bound on each individual probe.
const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a single probe.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: HealthStatus,
    pub duration: Duration,
}

/// Runs the `leadflow check` command. Fails when any probe is unhealthy.
pub async fn run_check(config: LeadflowConfig) -> Result<(), LeadflowError> {
    let queue_configured = config.queue.queue_url.is_some();
    let factory = AdapterFactory::new(config);
    let mut results = vec![CheckResult {
        name: "config".into(),
        status: HealthStatus::Healthy,
        duration: Duration::ZERO,
    }];

    match factory.object_store().await {
        Ok(store) => results.push(probe("object store", store.as_ref()).await),
        Err(e) => results.push(build_failed("object store", &e)),
    }
    match factory.owner_directory() {
        Ok(directory) => results.push(probe("owner directory", directory.as_ref()).await),
        Err(e) => results.push(build_failed("owner directory", &e)),
    }
    match factory.notifier().await {
        Ok(notifier) => results.push(probe("notifier", notifier.as_ref()).await),
        Err(e) => results.push(build_failed("notifier", &e)),
    }
    if queue_configured {
        match factory.message_source().await {
            Ok(source) => results.push(probe("queue", source.as_ref()).await),
            Err(e) => results.push(build_failed("queue", &e)),
        }
    }

    print_results(&results);

    let failures = results
        .iter()
        .filter(|r| matches!(r.status, HealthStatus::Unhealthy(_)))
        .count();
    if failures > 0 {
        return Err(LeadflowError::Internal(format!("{failures} check(s) failed")));
    }
    Ok(())
}

async fn probe<A: PluginAdapter + ?Sized>(label: &str, adapter: &A) -> CheckResult {
    let started = Instant::now();
    let status = match tokio::time::timeout(CHECK_TIMEOUT, adapter.health_check()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => HealthStatus::Unhealthy(e.to_string()),
        Err(_) => HealthStatus::Unhealthy(format!("no answer within {CHECK_TIMEOUT:?}")),
    };
    CheckResult {
        name: format!("{label} ({})", adapter.name()),
        status,
        duration: started.elapsed(),
    }
}

fn build_failed(label: &str, err: &LeadflowError) -> CheckResult {
    CheckResult {
        name: label.to_string(),
        status: HealthStatus::Unhealthy(err.to_string()),
        duration: Duration::ZERO,
    }
}

fn print_results(results: &[CheckResult]) {
    println!();
    println!("  leadflow check");
    println!("  {}", "-".repeat(50));
    for result in results {
        let (symbol, detail) = match &result.status {
            HealthStatus::Healthy => ("ok  ", String::new()),
            HealthStatus::Degraded(msg) => ("warn", format!(": {msg}")),
            HealthStatus::Unhealthy(msg) => ("FAIL", format!(": {msg}")),
        };
        println!(
            "  [{symbol}] {}{detail} ({}ms)",
            result.name,
            result.duration.as_millis()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unhealthy_filesystem_root_fails_check() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").expect("write");
        let root = file.display().to_string().replace('\\', "/");
        let config = leadflow_config::load_and_validate_str(&format!(
            r#"
            [enrichment]
            skip_owner_lookup = true
            [storage]
            root = "{root}"
            curated_bucket = "curated"
            error_bucket = "errors"
            "#
        ))
        .expect("valid config");

        assert!(run_check(config).await.is_err());
    }

    #[tokio::test]
    async fn healthy_local_setup_passes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().display().to_string().replace('\\', "/");
        let config = leadflow_config::load_and_validate_str(&format!(
            r#"
            [enrichment]
            skip_owner_lookup = true
            [storage]
            root = "{root}"
            curated_bucket = "curated"
            error_bucket = "errors"
            "#
        ))
        .expect("valid config");

        run_check(config).await.expect("all probes pass or degrade");
    }
}
