// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end test harness wiring the engine to in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use leadflow_core::{
    ErrorArtifact, EnrichedLead, LeadKey, LeadflowError, Notifier, ObjectStore, OwnerDirectory,
};
use leadflow_directory::{RetryPolicy, RetryingDirectory};
use leadflow_engine::{Clock, EngineSettings, EnrichmentEngine, MessageReport};
use leadflow_storage::{MemoryObjectStore, get_json, put_json};
use serde_json::Value;

use crate::mock_directory::MockDirectory;
use crate::mock_notifier::RecordingNotifier;
use crate::stalling_store::StallingStore;

pub const RAW_BUCKET: &str = "leads-raw";
pub const CURATED_BUCKET: &str = "leads-curated";
pub const ERROR_BUCKET: &str = "leads-errors";

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    directory: MockDirectory,
    notifier: Option<RecordingNotifier>,
    skip_owner_lookup: bool,
    curate_on_permanent_failure: bool,
    retry_transient: u32,
    notify_timeout: Duration,
    storage_timeout: Duration,
    stalled_bucket: Option<String>,
    clock: Option<Clock>,
}

impl TestHarnessBuilder {
    pub fn new() -> Self {
        Self {
            directory: MockDirectory::new(),
            notifier: Some(RecordingNotifier::new()),
            skip_owner_lookup: false,
            curate_on_permanent_failure: false,
            retry_transient: 0,
            notify_timeout: Duration::from_secs(10),
            storage_timeout: Duration::from_secs(5),
            stalled_bucket: None,
            clock: None,
        }
    }

    pub fn with_directory(mut self, directory: MockDirectory) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_notifier(mut self, notifier: RecordingNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn without_notifier(mut self) -> Self {
        self.notifier = None;
        self
    }

    pub fn with_skip_owner_lookup(mut self, skip: bool) -> Self {
        self.skip_owner_lookup = skip;
        self
    }

    pub fn with_curate_on_permanent_failure(mut self, curate: bool) -> Self {
        self.curate_on_permanent_failure = curate;
        self
    }

    /// Local retries for transient lookup failures. Backoff is zero.
    pub fn with_retry(mut self, retry_transient: u32) -> Self {
        self.retry_transient = retry_transient;
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// The engine's calls on `bucket` never complete. The harness's own
    /// helpers still reach the underlying store.
    pub fn with_stalled_bucket(mut self, bucket: &str) -> Self {
        self.stalled_bucket = Some(bucket.to_string());
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub async fn build(self) -> Result<TestHarness, LeadflowError> {
        let store = MemoryObjectStore::new();
        let policy = RetryPolicy {
            retry_transient: self.retry_transient,
            backoff_base: Duration::ZERO,
            backoff_jitter: Duration::ZERO,
        };
        let directory: Arc<dyn OwnerDirectory> =
            Arc::new(RetryingDirectory::new(self.directory.clone(), policy));
        let notifier = self
            .notifier
            .clone()
            .map(|n| Arc::new(n) as Arc<dyn Notifier>);

        let settings = EngineSettings {
            skip_owner_lookup: self.skip_owner_lookup,
            curated_bucket: CURATED_BUCKET.into(),
            error_bucket: ERROR_BUCKET.into(),
            curate_on_permanent_failure: self.curate_on_permanent_failure,
            storage_timeout: self.storage_timeout,
            notify_timeout: self.notify_timeout,
        };

        let engine_store: Arc<dyn ObjectStore> = match self.stalled_bucket {
            Some(bucket) => Arc::new(StallingStore::new(store.clone(), bucket)),
            None => Arc::new(store.clone()),
        };
        let mut engine = EnrichmentEngine::new(
            engine_store,
            directory,
            notifier,
            settings,
        );
        if let Some(clock) = self.clock {
            engine = engine.with_clock(clock);
        }

        Ok(TestHarness {
            store,
            directory: self.directory,
            notifier: self.notifier,
            engine: Arc::new(engine),
        })
    }
}

impl Default for TestHarnessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An engine over an in-memory store with handles to every collaborator.
pub struct TestHarness {
    pub store: MemoryObjectStore,
    pub directory: MockDirectory,
    pub notifier: Option<RecordingNotifier>,
    pub engine: Arc<EnrichmentEngine>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Writes `payload` at the raw key for `lead` and returns that key.
    pub async fn seed_raw(&self, lead: &LeadKey, payload: &Value) -> Result<String, LeadflowError> {
        let key = lead.raw_key();
        put_json(&self.store, RAW_BUCKET, &key, payload).await?;
        Ok(key)
    }

    pub async fn handle(&self, body: &str) -> Result<MessageReport, LeadflowError> {
        self.engine.handle_message(body).await
    }

    pub async fn curated(&self, lead: &LeadKey) -> Option<EnrichedLead> {
        get_json(&self.store, CURATED_BUCKET, &lead.curated_key()).await.ok()
    }

    pub async fn curated_value(&self, lead: &LeadKey) -> Option<Value> {
        get_json(&self.store, CURATED_BUCKET, &lead.curated_key()).await.ok()
    }

    pub async fn error_artifact(&self, lead: &LeadKey) -> Option<ErrorArtifact> {
        get_json(&self.store, ERROR_BUCKET, &lead.error_key()).await.ok()
    }

    /// Leads the notifier was asked to announce.
    pub async fn notified(&self) -> Vec<EnrichedLead> {
        match &self.notifier {
            Some(n) => n.sent().await,
            None => Vec::new(),
        }
    }
}
