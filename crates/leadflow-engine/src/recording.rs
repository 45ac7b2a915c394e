// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; the binary decides whether a Prometheus
//! recorder is installed. Without one every call is a no-op.

use leadflow_core::ErrorClass;
use metrics::{describe_counter, describe_histogram};

/// Register all leadflow metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "leadflow_objects_total",
        "Referenced objects handled, by outcome"
    );
    describe_counter!(
        "leadflow_lookup_failures_total",
        "Owner lookups that failed after local retries, by class"
    );
    describe_counter!(
        "leadflow_notifications_total",
        "Notification attempts, by result"
    );
    describe_counter!(
        "leadflow_messages_total",
        "Queue deliveries handled, by result"
    );
    describe_histogram!(
        "leadflow_lookup_duration_seconds",
        "Owner lookup latency including local retries"
    );
}

/// Record one referenced object: `skipped`, `processed`, or `permanent_failure`.
pub fn record_object(outcome: &'static str) {
    metrics::counter!("leadflow_objects_total", "outcome" => outcome).increment(1);
}

pub fn record_lookup_failure(class: ErrorClass) {
    metrics::counter!("leadflow_lookup_failures_total", "class" => class.to_string()).increment(1);
}

/// `delivered`, `disabled`, or `failed`.
pub fn record_notification(result: &'static str) {
    metrics::counter!("leadflow_notifications_total", "result" => result).increment(1);
}

/// `acked` or `redeliver`.
pub fn record_message(result: &'static str) {
    metrics::counter!("leadflow_messages_total", "result" => result).increment(1);
}

pub fn record_lookup_duration(seconds: f64) {
    metrics::histogram!("leadflow_lookup_duration_seconds").record(seconds);
}
