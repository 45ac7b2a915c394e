// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Block-formatted summary posted for each enriched lead.

use leadflow_core::EnrichedLead;
use serde_json::{Value, json};

const MISSING: &str = "N/A";
const NO_OWNER: &str = "Unassigned";

fn field(label: &str, value: &str) -> Value {
    json!({"type": "mrkdwn", "text": format!("*{label}:*\n{value}")})
}

/// Strings render bare; other JSON values render compactly.
fn or_missing(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::String(_)) | Some(Value::Null) | None => fallback.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Builds the webhook payload describing `lead`.
pub fn summary_message(lead: &EnrichedLead) -> Value {
    let status = lead.owner_lookup_status.to_string();
    json!({
        "text": "New Lead Alert",
        "blocks": [
            {"type": "header", "text": {"type": "plain_text", "text": "New Lead Enriched"}},
            {"type": "section", "fields": [
                field("Name", &or_missing(lead.display_name.as_ref(), MISSING)),
                field("Lead ID", &lead.lead_id),
                field("Created", &or_missing(lead.date_created.as_ref(), MISSING)),
                field("Label", &or_missing(lead.status_label.as_ref(), MISSING)),
                field("Email", &or_missing(lead.lead_email.as_ref(), MISSING)),
                field("Lead Owner", &or_missing(lead.lead_owner.as_ref(), NO_OWNER)),
                field("Funnel", &or_missing(lead.funnel.as_ref(), MISSING)),
                field("Owner lookup", &status),
            ]},
            {"type": "context", "elements": [
                {"type": "mrkdwn", "text": format!("Enriched at {}", lead.enriched_at)}
            ]},
        ],
    })
}
