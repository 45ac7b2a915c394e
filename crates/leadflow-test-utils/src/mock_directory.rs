// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted owner directory.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use leadflow_core::{
    AdapterType, HealthStatus, LeadflowError, LookupError, OwnerDirectory, OwnerRecord,
    PluginAdapter,
};
use tokio::sync::Mutex;

/// Owner directory that replays scripted results.
///
/// Results are popped from a FIFO queue; once it is empty every lookup gets
/// the fallback. Clones share the script and the call log.
#[derive(Clone)]
pub struct MockDirectory {
    script: Arc<Mutex<VecDeque<Result<OwnerRecord, LookupError>>>>,
    fallback: Result<OwnerRecord, LookupError>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::always(Ok(OwnerRecord::default()))
    }
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every lookup returns `result`.
    pub fn always(result: Result<OwnerRecord, LookupError>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback: result,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every lookup returns this owner.
    pub fn with_owner(owner: &str, email: &str) -> Self {
        Self::always(Ok(OwnerRecord {
            owner: Some(owner.into()),
            email: Some(email.into()),
            funnel: None,
        }))
    }

    /// Every lookup fails with `status`.
    pub fn failing_with_status(status: u16) -> Self {
        Self::always(Err(LookupError::Status {
            status,
            body: String::new(),
        }))
    }

    /// Every lookup times out.
    pub fn timing_out() -> Self {
        Self::always(Err(LookupError::Timeout {
            after: std::time::Duration::from_secs(5),
        }))
    }

    /// Results returned, in order, before the fallback applies.
    pub fn then(mut self, results: Vec<Result<OwnerRecord, LookupError>>) -> Self {
        self.script = Arc::new(Mutex::new(results.into()));
        self
    }

    /// Lead ids looked up so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for MockDirectory {
    fn name(&self) -> &str {
        "mock-directory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Directory
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl OwnerDirectory for MockDirectory {
    async fn lookup(&self, lead_id: &str) -> Result<OwnerRecord, LookupError> {
        self.calls.lock().await.push(lead_id.to_string());
        let scripted = self.script.lock().await.pop_front();
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}
