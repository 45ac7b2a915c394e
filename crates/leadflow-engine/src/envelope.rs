// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue message bodies to `(bucket, key)` references.
//!
//! A body is either an object-store event notification
//! (`{"Records": [{"s3": {"bucket": {"name"}, "object": {"key"}}}]}`) or a
//! topic fanout envelope whose `Message` string holds such a notification.

use leadflow_core::LeadflowError;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One object referenced by a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    pub bucket: String,
    /// Decoded object key.
    pub key: String,
}

#[derive(Debug, Deserialize)]
struct Fanout {
    #[serde(rename = "Message")]
    message: String,
}

/// Records are optional: provider test events carry none.
#[derive(Debug, Deserialize)]
struct StoreEvent {
    #[serde(rename = "Records", default)]
    records: Vec<StoreRecord>,
}

#[derive(Debug, Deserialize)]
struct StoreRecord {
    s3: StoreEntity,
}

#[derive(Debug, Deserialize)]
struct StoreEntity {
    bucket: BucketRef,
    object: ObjectKey,
}

#[derive(Debug, Deserialize)]
struct BucketRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectKey {
    key: String,
}

fn parse_error(source: serde_json::Error) -> LeadflowError {
    LeadflowError::EnvelopeParse { source }
}

/// Extracts every referenced object, in notification order.
///
/// A body that is not JSON, or whose records lack a bucket name or object
/// key, is an [`LeadflowError::EnvelopeParse`].
pub fn unwrap_envelope(body: &str) -> Result<Vec<ObjectRef>, LeadflowError> {
    let value: Value = serde_json::from_str(body).map_err(parse_error)?;

    let event: StoreEvent = if value.get("Message").is_some() {
        let fanout: Fanout = serde_json::from_value(value).map_err(parse_error)?;
        serde_json::from_str(&fanout.message).map_err(parse_error)?
    } else {
        serde_json::from_value(value).map_err(parse_error)?
    };

    Ok(event
        .records
        .into_iter()
        .map(|record| ObjectRef {
            bucket: record.s3.bucket.name,
            key: decode_key(&record.s3.object.key),
        })
        .collect())
}

/// Reverses the form encoding object stores apply to keys in notifications:
/// `+` is a space and `%XX` an escaped byte.
pub fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn direct(keys: &[&str]) -> String {
        let records: Vec<Value> = keys
            .iter()
            .map(|key| json!({"s3": {"bucket": {"name": "raw"}, "object": {"key": key}}}))
            .collect();
        json!({ "Records": records }).to_string()
    }

    #[test]
    fn direct_event_yields_records_in_order() {
        let refs = unwrap_envelope(&direct(&["a.json", "b.json"])).expect("parse");
        assert_eq!(
            refs,
            vec![
                ObjectRef {
                    bucket: "raw".into(),
                    key: "a.json".into()
                },
                ObjectRef {
                    bucket: "raw".into(),
                    key: "b.json".into()
                },
            ]
        );
    }

    #[test]
    fn fanout_envelope_is_unwrapped_once() {
        let body = json!({"Type": "Notification", "Message": direct(&["x.json"])}).to_string();
        let refs = unwrap_envelope(&body).expect("parse");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].key, "x.json");
    }

    #[test]
    fn event_without_records_is_empty() {
        let body = json!({"Event": "s3:TestEvent", "Bucket": "raw"}).to_string();
        assert!(unwrap_envelope(&body).expect("parse").is_empty());
    }

    #[test]
    fn malformed_bodies_fail() {
        for body in [
            "not json",
            "[1, 2]",
            r#"{"Message": 42}"#,
            r#"{"Message": "not json either"}"#,
            r#"{"Records": [{"s3": {"bucket": {"name": "raw"}}}]}"#,
            r#"{"Records": "nope"}"#,
        ] {
            let err = unwrap_envelope(body).expect_err(body);
            assert!(matches!(err, LeadflowError::EnvelopeParse { .. }), "{body}");
        }
    }

    #[test]
    fn keys_are_form_decoded() {
        assert_eq!(
            decode_key("crm/lead_created/dt%3D2024-03-01/lead_id%3DL+1/crm_event_L+1.json"),
            "crm/lead_created/dt=2024-03-01/lead_id=L 1/crm_event_L 1.json"
        );
        assert_eq!(decode_key("a%2Bb"), "a+b");
        assert_eq!(decode_key("plain/key.json"), "plain/key.json");
    }
}
