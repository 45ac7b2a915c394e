// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the engine and its adapters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    ObjectStore,
    Directory,
    Notifier,
    Secrets,
    Queue,
}

/// Which owner-lookup path produced a curated artifact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LookupStatus {
    /// The directory returned a record.
    Ok,
    /// Lookups are disabled by configuration.
    Skipped,
    /// The directory rejected the lead permanently.
    PermanentFailed,
}

/// Outcome of a notification attempt that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyReceipt {
    /// The endpoint accepted the notification.
    Delivered { status: u16 },
    /// No notification target is configured.
    Disabled,
}

/// An as-ingested CRM webhook payload.
///
/// The engine reads only `event.data.{display_name,status_label,date_created}`;
/// everything else is carried opaquely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Value);

impl RawEvent {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The `event.data` object, if the payload has one.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.0.get("event")?.get("data")?.as_object()
    }

    /// A field of `event.data` exactly as ingested. JSON `null` counts as absent.
    pub fn data_field(&self, name: &str) -> Option<Value> {
        self.data()
            .and_then(|data| data.get(name))
            .filter(|value| !value.is_null())
            .cloned()
    }
}

/// Renders a JSON scalar as text. Null, objects, and arrays yield `None`.
pub fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Enrichment attributes returned by the owner directory, as returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRecord {
    #[serde(rename = "lead_owner", default)]
    pub owner: Option<Value>,
    #[serde(rename = "lead_email", default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub funnel: Option<Value>,
}

impl OwnerRecord {
    /// Builds a record from a directory response without ever failing.
    ///
    /// Field values pass through unchanged; a non-object body or a `null`
    /// field leaves the attribute empty.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).filter(|v| !v.is_null()).cloned();
        Self {
            owner: field("lead_owner"),
            email: field("lead_email"),
            funnel: field("funnel"),
        }
    }
}

/// The curated artifact written for every enriched lead.
///
/// Copied attributes keep their upstream JSON type. Absent values serialize
/// as JSON `null`, never as missing keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedLead {
    pub lead_id: String,
    pub display_name: Option<Value>,
    pub status_label: Option<Value>,
    pub date_created: Option<Value>,
    pub lead_email: Option<Value>,
    pub lead_owner: Option<Value>,
    pub funnel: Option<Value>,
    /// Mirrors `lead_owner`.
    pub assignee: Option<Value>,
    pub enriched_at: String,
    pub owner_lookup_status: LookupStatus,
}

/// Record of a lead whose owner lookup can never succeed without intervention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorArtifact {
    pub lead_id: String,
    /// `permanent:<kind>`
    pub reason: String,
    pub at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_event_reads_nested_data_fields() {
        let raw = RawEvent::new(json!({
            "event": {"data": {
                "display_name": "Jane Doe",
                "date_created": 1709285400,
                "status_label": {"id": 3, "name": "Qualified"},
                "funnel": null
            }}
        }));
        assert_eq!(raw.data_field("display_name"), Some(json!("Jane Doe")));
        assert_eq!(raw.data_field("date_created"), Some(json!(1709285400)));
        assert_eq!(
            raw.data_field("status_label"),
            Some(json!({"id": 3, "name": "Qualified"}))
        );
        assert_eq!(raw.data_field("funnel"), None);
        assert_eq!(raw.data_field("lead_score"), None);
    }

    #[test]
    fn raw_event_without_data_is_empty_not_an_error() {
        for value in [json!({}), json!({"event": null}), json!({"event": {"data": "x"}}), json!([1, 2])] {
            let raw = RawEvent::new(value);
            assert!(raw.data().is_none());
            assert_eq!(raw.data_field("display_name"), None);
        }
    }

    #[test]
    fn owner_record_tolerates_odd_shapes() {
        let full = OwnerRecord::from_value(&json!({
            "lead_owner": "alice", "lead_email": "a@x.com", "funnel": "inbound", "extra": 1
        }));
        assert_eq!(full.owner, Some(json!("alice")));
        assert_eq!(full.email, Some(json!("a@x.com")));
        assert_eq!(full.funnel, Some(json!("inbound")));

        assert_eq!(OwnerRecord::from_value(&json!([1, 2, 3])), OwnerRecord::default());
        assert_eq!(
            OwnerRecord::from_value(&json!({"lead_email": null})),
            OwnerRecord::default()
        );
        let nested = OwnerRecord::from_value(&json!({"lead_owner": {"name": "alice"}}));
        assert_eq!(nested.owner, Some(json!({"name": "alice"})));
    }

    #[test]
    fn enriched_lead_serializes_nulls_and_snake_case_status() {
        let lead = EnrichedLead {
            lead_id: "lead_1".into(),
            display_name: None,
            status_label: None,
            date_created: None,
            lead_email: None,
            lead_owner: None,
            funnel: None,
            assignee: None,
            enriched_at: "2024-03-01T00:00:00+00:00".into(),
            owner_lookup_status: LookupStatus::PermanentFailed,
        };
        let value = serde_json::to_value(&lead).unwrap();
        assert_eq!(value["display_name"], Value::Null);
        assert_eq!(value["owner_lookup_status"], "permanent_failed");
        assert_eq!(value.as_object().unwrap().len(), 10);
    }

    #[test]
    fn error_artifact_omits_absent_detail() {
        let artifact = ErrorArtifact {
            lead_id: "lead_1".into(),
            reason: "permanent:HttpStatus".into(),
            at: "2024-03-01T00:00:00+00:00".into(),
            detail: None,
        };
        let value = serde_json::to_value(&artifact).unwrap();
        assert!(value.get("detail").is_none());
    }
}
