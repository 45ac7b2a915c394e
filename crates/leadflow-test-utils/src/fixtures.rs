// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payload and notification builders.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use leadflow_engine::Clock;
use serde_json::{Value, json};

/// A CRM `lead_created` webhook payload.
pub fn raw_event(lead_id: &str, display_name: &str, status_label: &str, date_created: &str) -> Value {
    json!({
        "event": {
            "lead_id": lead_id,
            "object_type": "lead",
            "action": "created",
            "data": {
                "display_name": display_name,
                "status_label": status_label,
                "date_created": date_created,
            }
        }
    })
}

/// An object-store "object created" notification for `keys`.
///
/// Keys are used as given, so callers pass them already form-encoded when
/// they want to exercise decoding.
pub fn s3_event_body(bucket: &str, keys: &[&str]) -> String {
    let records: Vec<Value> = keys
        .iter()
        .map(|key| {
            json!({
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": {"name": bucket},
                    "object": {"key": key, "size": 128}
                }
            })
        })
        .collect();
    json!({ "Records": records }).to_string()
}

/// Wraps a notification body in a topic fanout envelope.
pub fn fanout_body(inner: &str) -> String {
    json!({
        "Type": "Notification",
        "MessageId": "00000000-0000-0000-0000-000000000001",
        "Message": inner,
    })
    .to_string()
}

/// A clock that starts at `start` and advances one second per reading.
pub fn stepping_clock(start: DateTime<Utc>) -> Clock {
    let ticks = Arc::new(AtomicI64::new(0));
    Arc::new(move || start + TimeDelta::seconds(ticks.fetch_add(1, Ordering::SeqCst)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stepping_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let clock = stepping_clock(start);
        assert_eq!(clock(), start);
        assert_eq!(clock() - start, TimeDelta::seconds(1));
    }

    #[test]
    fn fanout_carries_inner_body_as_string() {
        let inner = s3_event_body("raw", &["a"]);
        let outer: Value = serde_json::from_str(&fanout_body(&inner)).unwrap();
        assert_eq!(outer["Message"].as_str(), Some(inner.as_str()));
    }
}
