// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory object store.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use leadflow_core::{AdapterType, HealthStatus, LeadflowError, ObjectStore, PluginAdapter};

use crate::{validate_bucket, validate_key};

/// Object store backed by a shared map keyed on `(bucket, key)`.
///
/// Clones share the same objects, so a test can hold one handle while the
/// engine writes through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<BTreeMap<(String, String), StoredObject>>>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the content type recorded at write time.
    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.objects.read().ok().and_then(|objects| {
            objects
                .get(&(bucket.to_string(), key.to_string()))
                .map(|o| o.content_type.clone())
        })
    }

    /// Number of objects across all buckets.
    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deletes an object; returns whether it existed.
    pub fn remove(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .write()
            .map(|mut objects| {
                objects
                    .remove(&(bucket.to_string(), key.to_string()))
                    .is_some()
            })
            .unwrap_or(false)
    }
}

fn poisoned() -> LeadflowError {
    LeadflowError::Internal("lock poisoned".into())
}

#[async_trait]
impl PluginAdapter for MemoryObjectStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ObjectStore
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        match self.objects.read() {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(_) => Ok(HealthStatus::Unhealthy("lock poisoned".into())),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, LeadflowError> {
        let objects = self.objects.read().map_err(|_| poisoned())?;
        objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| o.data.clone())
            .ok_or_else(|| LeadflowError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), LeadflowError> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, LeadflowError> {
        let objects = self.objects.read().map_err(|_| poisoned())?;
        Ok(objects.contains_key(&(bucket.to_string(), key.to_string())))
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, LeadflowError> {
        let objects = self.objects.read().map_err(|_| poisoned())?;
        Ok(objects
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.clone())
            .collect())
    }
}
