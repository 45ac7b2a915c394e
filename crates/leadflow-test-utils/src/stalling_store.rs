// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object store whose calls on one bucket never complete.

use async_trait::async_trait;
use bytes::Bytes;
use leadflow_core::{AdapterType, HealthStatus, LeadflowError, ObjectStore, PluginAdapter};
use leadflow_storage::MemoryObjectStore;

/// Delegates to a [`MemoryObjectStore`], except that every call touching
/// `stalled_bucket` pends forever.
#[derive(Clone)]
pub struct StallingStore {
    inner: MemoryObjectStore,
    stalled_bucket: String,
}

impl StallingStore {
    pub fn new(inner: MemoryObjectStore, stalled_bucket: impl Into<String>) -> Self {
        Self {
            inner,
            stalled_bucket: stalled_bucket.into(),
        }
    }

    async fn gate(&self, bucket: &str) {
        if bucket == self.stalled_bucket {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl PluginAdapter for StallingStore {
    fn name(&self) -> &str {
        "stalling"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ObjectStore
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ObjectStore for StallingStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, LeadflowError> {
        self.gate(bucket).await;
        self.inner.get(bucket, key).await
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), LeadflowError> {
        self.gate(bucket).await;
        self.inner.put(bucket, key, body, content_type).await
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, LeadflowError> {
        self.gate(bucket).await;
        self.inner.exists(bucket, key).await
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, LeadflowError> {
        self.gate(bucket).await;
        self.inner.list(bucket, prefix).await
    }
}
