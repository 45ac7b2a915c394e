// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object-key layout for raw, curated, and error artifacts.
//!
//! Every artifact for a lead lives at a path that is a pure function of
//! `(day, lead_id)`:
//!
//! ```text
//! crm/lead_created/dt=<YYYY-MM-DD>/lead_id=<ID>/crm_event_<ID>.json
//! crm/lead_enriched/dt=<YYYY-MM-DD>/lead_id=<ID>/lead_<ID>.json
//! crm/errors/dt=<YYYY-MM-DD>/lead_id=<ID>/owner_lookup_failed.json
//! ```
//!
//! Reprocessing the same raw object therefore overwrites its outputs instead
//! of duplicating them.

use std::fmt;

/// Prefix under which ingestion writes raw webhook payloads.
pub const RAW_PREFIX: &str = "crm/lead_created";

/// Prefix for curated (enriched) lead artifacts.
pub const CURATED_PREFIX: &str = "crm/lead_enriched";

/// Prefix for permanent owner-lookup failure artifacts.
pub const ERROR_PREFIX: &str = "crm/errors";

/// File name of the error artifact inside a lead's partition.
pub const ERROR_FILE: &str = "owner_lookup_failed.json";

const RAW_SEGMENTS: usize = 5;

/// The `(day, lead_id)` pair that identifies a lead's partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeadKey {
    /// Day partition, `YYYY-MM-DD`.
    pub day: String,
    /// CRM lead identifier.
    pub lead_id: String,
}

impl LeadKey {
    pub fn new(day: impl Into<String>, lead_id: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            lead_id: lead_id.into(),
        }
    }

    /// Parses a raw-object key of the shape
    /// `crm/lead_created/dt=<day>/lead_id=<id>/<file>`.
    ///
    /// Returns `None` for anything else. Unrelated producers share the bucket,
    /// so a mismatch means "not ours", not an error.
    pub fn parse_raw(key: &str) -> Option<Self> {
        let rest = key.strip_prefix(RAW_PREFIX)?.strip_prefix('/')?;
        let parts: Vec<&str> = key.split('/').collect();
        if parts.len() != RAW_SEGMENTS || rest.is_empty() {
            return None;
        }

        let day = parts[2].strip_prefix("dt=")?;
        let lead_id = parts[3].strip_prefix("lead_id=")?;
        let file = parts[4];
        if day.is_empty() || lead_id.is_empty() || file.is_empty() {
            return None;
        }

        Some(Self::new(day, lead_id))
    }

    /// Key at which ingestion stores the raw event.
    pub fn raw_key(&self) -> String {
        format!(
            "{RAW_PREFIX}/dt={}/lead_id={}/crm_event_{}.json",
            self.day, self.lead_id, self.lead_id
        )
    }

    /// Key of the curated artifact.
    pub fn curated_key(&self) -> String {
        format!(
            "{CURATED_PREFIX}/dt={}/lead_id={}/lead_{}.json",
            self.day, self.lead_id, self.lead_id
        )
    }

    /// Key of the error artifact.
    pub fn error_key(&self) -> String {
        format!(
            "{ERROR_PREFIX}/dt={}/lead_id={}/{ERROR_FILE}",
            self.day, self.lead_id
        )
    }
}

impl fmt::Display for LeadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dt={}/lead_id={}", self.day, self.lead_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_documented_raw_key() {
        let key = "crm/lead_created/dt=2024-03-01/lead_id=lead_abc/crm_event_lead_abc.json";
        let parsed = LeadKey::parse_raw(key).expect("should parse");
        assert_eq!(parsed.day, "2024-03-01");
        assert_eq!(parsed.lead_id, "lead_abc");
    }

    #[test]
    fn derives_documented_paths() {
        let lead = LeadKey::new("2024-03-01", "lead_abc");
        assert_eq!(
            lead.raw_key(),
            "crm/lead_created/dt=2024-03-01/lead_id=lead_abc/crm_event_lead_abc.json"
        );
        assert_eq!(
            lead.curated_key(),
            "crm/lead_enriched/dt=2024-03-01/lead_id=lead_abc/lead_lead_abc.json"
        );
        assert_eq!(
            lead.error_key(),
            "crm/errors/dt=2024-03-01/lead_id=lead_abc/owner_lookup_failed.json"
        );
    }

    #[test]
    fn rejects_foreign_prefixes() {
        assert!(LeadKey::parse_raw("crm/lead_enriched/dt=2024-03-01/lead_id=a/lead_a.json").is_none());
        assert!(LeadKey::parse_raw("other/lead_created/dt=2024-03-01/lead_id=a/x.json").is_none());
        assert!(LeadKey::parse_raw("crm/lead_createdX/dt=2024-03-01/lead_id=a/x.json").is_none());
        assert!(LeadKey::parse_raw("").is_none());
    }

    #[test]
    fn rejects_wrong_segment_counts() {
        assert!(LeadKey::parse_raw("crm/lead_created/dt=2024-03-01/lead_id=a").is_none());
        assert!(LeadKey::parse_raw("crm/lead_created/dt=2024-03-01/lead_id=a/x/y.json").is_none());
        assert!(LeadKey::parse_raw("crm/lead_created/").is_none());
    }

    #[test]
    fn rejects_missing_partition_markers() {
        assert!(LeadKey::parse_raw("crm/lead_created/2024-03-01/lead_id=a/x.json").is_none());
        assert!(LeadKey::parse_raw("crm/lead_created/dt=2024-03-01/a/x.json").is_none());
        assert!(LeadKey::parse_raw("crm/lead_created/dt=/lead_id=a/x.json").is_none());
        assert!(LeadKey::parse_raw("crm/lead_created/dt=2024-03-01/lead_id=/x.json").is_none());
        assert!(LeadKey::parse_raw("crm/lead_created/dt=2024-03-01/lead_id=a/").is_none());
    }

    proptest! {
        #[test]
        fn raw_keys_parse_back_exactly(
            day in "[0-9]{4}-[0-9]{2}-[0-9]{2}",
            lead_id in "[A-Za-z0-9_-]{1,32}",
        ) {
            let lead = LeadKey::new(day.clone(), lead_id.clone());
            let parsed = LeadKey::parse_raw(&lead.raw_key()).expect("derived key must parse");
            prop_assert_eq!(&parsed, &lead);
            prop_assert_eq!(
                parsed.curated_key(),
                format!("crm/lead_enriched/dt={day}/lead_id={lead_id}/lead_{lead_id}.json")
            );
            prop_assert_eq!(
                parsed.error_key(),
                format!("crm/errors/dt={day}/lead_id={lead_id}/owner_lookup_failed.json")
            );
        }
    }
}
