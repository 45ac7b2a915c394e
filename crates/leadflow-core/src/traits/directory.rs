// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner directory trait for per-lead enrichment lookups.

use async_trait::async_trait;

use crate::lookup::LookupError;
use crate::traits::adapter::PluginAdapter;
use crate::types::OwnerRecord;

/// Remote lookup service returning enrichment attributes for a lead.
///
/// Failures are reported as [`LookupError`] so callers can classify them
/// with [`crate::lookup::classify`].
#[async_trait]
pub trait OwnerDirectory: PluginAdapter {
    /// Fetches the owner record for a lead.
    async fn lookup(&self, lead_id: &str) -> Result<OwnerRecord, LookupError>;
}
