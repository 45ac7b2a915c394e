// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The enrichment engine: one queue delivery in, artifacts out.
//!
//! Per delivery:
//!
//! ```text
//! RECEIVED -> for each referenced key: SKIP | PROCESSED | PERMANENT_FAILURE_RECORDED -> Ok (ack)
//! RECEIVED -> TRANSIENT_ERROR -> Err (no ack; the queue redelivers, then dead-letters)
//! ```
//!
//! Keys are handled sequentially and the first error aborts the rest of the
//! delivery. Every artifact lives at a key derived only from `(day, lead_id)`,
//! so a redelivered message rewrites the same objects.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use leadflow_config::LeadflowConfig;
use leadflow_core::{
    EnrichedLead, ErrorArtifact, ErrorClass, LeadKey, LeadflowError, LookupError, LookupStatus,
    Notifier, NotifyReceipt, ObjectStore, OwnerDirectory, OwnerRecord, RawEvent, classify,
};
use leadflow_storage::put_json;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::envelope::{ObjectRef, unwrap_envelope};
use crate::merge::merge;
use crate::recording;

/// Source of `enriched_at` / `at` timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Formats a timestamp the way every artifact stores it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Engine knobs taken from configuration.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub skip_owner_lookup: bool,
    pub curated_bucket: String,
    pub error_bucket: String,
    /// Also write a curated artifact when the lookup fails permanently.
    pub curate_on_permanent_failure: bool,
    /// Bound on each object store call.
    pub storage_timeout: Duration,
    /// Bound on one notification, secret resolution included.
    pub notify_timeout: Duration,
}

impl EngineSettings {
    pub fn from_config(config: &LeadflowConfig) -> Result<Self, LeadflowError> {
        let required = |value: &Option<String>, name: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| LeadflowError::Config(format!("storage.{name} is required")))
        };
        Ok(Self {
            skip_owner_lookup: config.enrichment.skip_owner_lookup,
            curated_bucket: required(&config.storage.curated_bucket, "curated_bucket")?,
            error_bucket: required(&config.storage.error_bucket, "error_bucket")?,
            curate_on_permanent_failure: config.enrichment.curate_on_permanent_failure,
            storage_timeout: config.storage.timeout(),
            notify_timeout: config.notify.timeout() * 2,
        })
    }
}

/// What happened to one referenced object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ObjectOutcome {
    /// Not a raw-object key; ignored.
    Skipped,
    /// Curated artifact written.
    Processed {
        lead_id: String,
        day: String,
        owner_lookup_status: LookupStatus,
    },
    /// Error artifact written; the lead needs manual correction.
    PermanentFailureRecorded {
        lead_id: String,
        day: String,
        reason: String,
    },
}

impl ObjectOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Processed { .. } => "processed",
            Self::PermanentFailureRecorded { .. } => "permanent_failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectReport {
    pub bucket: String,
    pub key: String,
    #[serde(flatten)]
    pub outcome: ObjectOutcome,
}

/// Result of a delivery the caller may acknowledge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageReport {
    pub objects: Vec<ObjectReport>,
}

impl MessageReport {
    pub fn processed(&self) -> usize {
        self.count(|o| matches!(o, ObjectOutcome::Processed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ObjectOutcome::Skipped))
    }

    pub fn permanent_failures(&self) -> usize {
        self.count(|o| matches!(o, ObjectOutcome::PermanentFailureRecorded { .. }))
    }

    fn count(&self, pred: impl Fn(&ObjectOutcome) -> bool) -> usize {
        self.objects.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Orchestrates store, directory and notifier for each delivery.
///
/// Collaborators are injected; the engine holds no other state, so one
/// instance can serve any number of sequential or concurrent deliveries.
pub struct EnrichmentEngine {
    store: Arc<dyn ObjectStore>,
    directory: Arc<dyn OwnerDirectory>,
    notifier: Option<Arc<dyn Notifier>>,
    settings: EngineSettings,
    clock: Clock,
}

impl std::fmt::Debug for EnrichmentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentEngine")
            .field("store", &self.store.name())
            .field("directory", &self.directory.name())
            .field("notifier", &self.notifier.as_ref().map(|n| n.name()))
            .field("settings", &self.settings)
            .finish()
    }
}

impl EnrichmentEngine {
    /// `directory` should already carry the retry policy
    /// (see `leadflow_directory::RetryingDirectory`).
    pub fn new(
        store: Arc<dyn ObjectStore>,
        directory: Arc<dyn OwnerDirectory>,
        notifier: Option<Arc<dyn Notifier>>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
            settings,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock (tests).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn now(&self) -> String {
        format_timestamp((self.clock)())
    }

    /// Handles one queue delivery body.
    ///
    /// `Ok` means every referenced object was skipped, processed, or routed
    /// to the error namespace and the delivery may be acknowledged. `Err`
    /// means it must not be.
    pub async fn handle_message(&self, body: &str) -> Result<MessageReport, LeadflowError> {
        let result = self.handle_refs(body).await;
        match &result {
            Ok(report) => {
                recording::record_message("acked");
                debug!(
                    processed = report.processed(),
                    skipped = report.skipped(),
                    permanent_failures = report.permanent_failures(),
                    "delivery handled"
                );
            }
            Err(e) => {
                recording::record_message("redeliver");
                error!(error = %e, "delivery failed; leaving it for redelivery");
            }
        }
        result
    }

    async fn handle_refs(&self, body: &str) -> Result<MessageReport, LeadflowError> {
        let refs = unwrap_envelope(body)?;
        let mut report = MessageReport::default();
        for ObjectRef { bucket, key } in refs {
            let outcome = self.process_object(&bucket, &key).await?;
            report.objects.push(ObjectReport {
                bucket,
                key,
                outcome,
            });
        }
        Ok(report)
    }

    /// Handles one referenced raw object.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn process_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<ObjectOutcome, LeadflowError> {
        let Some(lead) = LeadKey::parse_raw(key) else {
            debug!(bucket, key, "not a raw lead object, skipping");
            recording::record_object("skipped");
            return Ok(ObjectOutcome::Skipped);
        };

        let data = self.bounded(self.store.get(bucket, key)).await?;
        let raw = RawEvent::from_slice(&data).map_err(|source| LeadflowError::RawDecode {
            key: key.to_string(),
            source,
        })?;

        let (owner, status, failure) = self.lookup_owner(&lead).await?;
        let enriched = merge(&lead, &raw, owner.as_ref(), status, self.now());

        let outcome = match failure {
            None => {
                self.write_curated(&lead, &enriched).await?;
                info!(lead = %lead, status = %status, "lead enriched");
                ObjectOutcome::Processed {
                    lead_id: lead.lead_id.clone(),
                    day: lead.day.clone(),
                    owner_lookup_status: status,
                }
            }
            Some(err) => {
                let reason = self.record_permanent_failure(&lead, &err).await?;
                if self.settings.curate_on_permanent_failure {
                    self.write_curated(&lead, &enriched).await?;
                }
                ObjectOutcome::PermanentFailureRecorded {
                    lead_id: lead.lead_id.clone(),
                    day: lead.day.clone(),
                    reason,
                }
            }
        };
        recording::record_object(outcome.label());

        self.notify(&enriched).await;
        Ok(outcome)
    }

    /// Runs the lookup and sorts the result into the three paths.
    ///
    /// Transient and unknown failures propagate; a permanent one comes back
    /// as the third element so the caller can record it.
    async fn lookup_owner(
        &self,
        lead: &LeadKey,
    ) -> Result<(Option<OwnerRecord>, LookupStatus, Option<LookupError>), LeadflowError> {
        if self.settings.skip_owner_lookup {
            return Ok((None, LookupStatus::Skipped, None));
        }

        let started = Instant::now();
        let result = self.directory.lookup(&lead.lead_id).await;
        recording::record_lookup_duration(started.elapsed().as_secs_f64());

        match result {
            Ok(record) => Ok((Some(record), LookupStatus::Ok, None)),
            Err(err) => {
                let class = classify(&err);
                recording::record_lookup_failure(class);
                match class {
                    ErrorClass::Permanent => {
                        warn!(lead = %lead, error = %err, "owner lookup failed permanently");
                        Ok((None, LookupStatus::PermanentFailed, Some(err)))
                    }
                    ErrorClass::Transient | ErrorClass::Unknown => {
                        Err(LeadflowError::TransientLookup {
                            lead_id: lead.lead_id.clone(),
                            class,
                            source: err,
                        })
                    }
                }
            }
        }
    }

    async fn write_curated(
        &self,
        lead: &LeadKey,
        enriched: &EnrichedLead,
    ) -> Result<(), LeadflowError> {
        self.bounded(put_json(
            self.store.as_ref(),
            &self.settings.curated_bucket,
            &lead.curated_key(),
            enriched,
        ))
        .await
    }

    /// Writes the error artifact and returns its reason.
    async fn record_permanent_failure(
        &self,
        lead: &LeadKey,
        err: &LookupError,
    ) -> Result<String, LeadflowError> {
        let artifact = ErrorArtifact {
            lead_id: lead.lead_id.clone(),
            reason: format!("permanent:{}", err.kind()),
            at: self.now(),
            detail: Some(err.to_string()),
        };
        self.bounded(put_json(
            self.store.as_ref(),
            &self.settings.error_bucket,
            &lead.error_key(),
            &artifact,
        ))
        .await?;
        Ok(artifact.reason)
    }

    /// Best effort: failures are logged and never returned.
    async fn notify(&self, lead: &EnrichedLead) {
        let Some(notifier) = &self.notifier else {
            return;
        };

        let result = tokio::time::timeout(self.settings.notify_timeout, notifier.notify(lead)).await;
        match result {
            Ok(Ok(NotifyReceipt::Delivered { status })) => {
                debug!(lead_id = %lead.lead_id, status, "notification delivered");
                recording::record_notification("delivered");
            }
            Ok(Ok(NotifyReceipt::Disabled)) => recording::record_notification("disabled"),
            Ok(Err(e)) => {
                warn!(lead_id = %lead.lead_id, error = %e, "notification failed");
                recording::record_notification("failed");
            }
            Err(_) => {
                warn!(
                    lead_id = %lead.lead_id,
                    timeout_ms = self.settings.notify_timeout.as_millis() as u64,
                    "notification timed out"
                );
                recording::record_notification("failed");
            }
        }
    }

    /// Bounds a store call by the storage timeout.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, LeadflowError>>,
    ) -> Result<T, LeadflowError> {
        tokio::time::timeout(self.settings.storage_timeout, call)
            .await
            .map_err(|_| LeadflowError::Timeout {
                duration: self.settings.storage_timeout,
            })?
    }
}
