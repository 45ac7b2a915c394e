// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capture path: webhook payload -> raw object.
//!
//! The raw key is derived from `(day, lead_id)` only, so a CRM retrying the
//! same webhook on the same day overwrites rather than duplicates.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use leadflow_core::{LeadKey, LeadflowError, ObjectStore, text_value};
use leadflow_storage::put_json;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::engine::{Clock, format_timestamp};

/// Where an ingested payload was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReceipt {
    pub bucket: String,
    pub key: String,
    pub lead_id: String,
    pub day: String,
}

/// Writes webhook payloads into the raw bucket.
pub struct Ingestor {
    store: Arc<dyn ObjectStore>,
    raw_bucket: String,
    storage_timeout: Duration,
    clock: Clock,
}

impl Ingestor {
    pub fn new(store: Arc<dyn ObjectStore>, raw_bucket: impl Into<String>, storage_timeout: Duration) -> Self {
        Self {
            store,
            raw_bucket: raw_bucket.into(),
            storage_timeout,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Parses and ingests a request body.
    pub async fn ingest_slice(&self, body: &[u8]) -> Result<IngestReceipt, LeadflowError> {
        let payload: Value = serde_json::from_slice(body)
            .map_err(|e| LeadflowError::InvalidInput(format!("invalid JSON body: {e}")))?;
        self.ingest(payload).await
    }

    /// Stamps the payload and stores it at its raw key.
    ///
    /// Nothing is written when the payload has no usable lead id.
    pub async fn ingest(&self, payload: Value) -> Result<IngestReceipt, LeadflowError> {
        let Value::Object(mut body) = payload else {
            return Err(LeadflowError::InvalidInput(
                "webhook body must be a JSON object".into(),
            ));
        };

        let lead_id = extract_lead_id(&body)
            .ok_or_else(|| LeadflowError::InvalidInput("missing lead_id".into()))?;
        if lead_id.contains('/') {
            return Err(LeadflowError::InvalidInput(format!(
                "lead_id must not contain '/': {lead_id}"
            )));
        }

        let now = (self.clock)();
        let day = extract_day(&body).unwrap_or_else(|| now.date_naive().to_string());

        body.insert("ingested_at".into(), Value::String(format_timestamp(now)));
        body.insert("assignee".into(), Value::Null);
        body.insert("enrichment_status".into(), Value::String("pending".into()));

        let key = LeadKey::new(day, lead_id).raw_key();
        tokio::time::timeout(
            self.storage_timeout,
            put_json(self.store.as_ref(), &self.raw_bucket, &key, &body),
        )
        .await
        .map_err(|_| LeadflowError::Timeout {
            duration: self.storage_timeout,
        })??;

        let lead = LeadKey::parse_raw(&key).ok_or_else(|| {
            LeadflowError::Internal(format!("derived raw key does not parse: {key}"))
        })?;
        info!(lead = %lead, bucket = %self.raw_bucket, "raw event stored");
        Ok(IngestReceipt {
            bucket: self.raw_bucket.clone(),
            key,
            lead_id: lead.lead_id,
            day: lead.day,
        })
    }
}

fn event(body: &Map<String, Value>) -> Option<&Map<String, Value>> {
    body.get("event").and_then(Value::as_object)
}

/// `event.lead_id`, then `lead_id`, then `event.object_id`; empty values skip.
pub fn extract_lead_id(body: &Map<String, Value>) -> Option<String> {
    let event = event(body);
    [
        event.and_then(|e| e.get("lead_id")),
        body.get("lead_id"),
        event.and_then(|e| e.get("object_id")),
    ]
    .into_iter()
    .flatten()
    .filter_map(text_value)
    .map(|id| id.trim().to_string())
    .find(|id| !id.is_empty())
}

/// The day partition from `event.date_created` or `event.data.date_created`.
///
/// Only the first ten characters are used, and only when they form a
/// `YYYY-MM-DD` date.
pub fn extract_day(body: &Map<String, Value>) -> Option<String> {
    let event = event(body)?;
    [
        event.get("date_created"),
        event
            .get("data")
            .and_then(Value::as_object)
            .and_then(|data| data.get("date_created")),
    ]
    .into_iter()
    .flatten()
    .filter_map(Value::as_str)
    .filter_map(|date| date.get(..10))
    .find(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok())
    .map(String::from)
}
