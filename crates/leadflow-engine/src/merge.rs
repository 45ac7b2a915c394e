// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw event + owner record -> curated artifact.

use leadflow_core::{EnrichedLead, LeadKey, LookupStatus, OwnerRecord, RawEvent};

/// Builds the curated artifact for a lead.
///
/// Total over every input shape: fields missing from the raw event or the
/// owner record become `None`, present ones keep their JSON type.
/// `assignee` mirrors the owner.
pub fn merge(
    key: &LeadKey,
    raw: &RawEvent,
    owner: Option<&OwnerRecord>,
    status: LookupStatus,
    enriched_at: String,
) -> EnrichedLead {
    let owner = owner.cloned().unwrap_or_default();
    EnrichedLead {
        lead_id: key.lead_id.clone(),
        display_name: raw.data_field("display_name"),
        status_label: raw.data_field("status_label"),
        date_created: raw.data_field("date_created"),
        lead_email: owner.email,
        assignee: owner.owner.clone(),
        lead_owner: owner.owner,
        funnel: owner.funnel,
        enriched_at,
        owner_lookup_status: status,
    }
}
