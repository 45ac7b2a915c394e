// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem object store: `<root>/<bucket>/<key>`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use leadflow_core::{AdapterType, HealthStatus, LeadflowError, ObjectStore, PluginAdapter};
use tracing::debug;

use crate::{validate_bucket, validate_key};

/// Directory under the root where writes are staged before the rename.
const STAGING_DIR: &str = ".staging";

/// Object store that keeps each bucket as a directory under `root`.
///
/// Writes go to a staging file first and are renamed into place, so readers
/// never observe a partially written object.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Creates the store, creating `root` if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, LeadflowError> {
        let root = root.into();
        tokio::fs::create_dir_all(root.join(STAGING_DIR))
            .await
            .map_err(|e| io_error("create object root", e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, bucket: &str, key: &str) -> Result<PathBuf, LeadflowError> {
        validate_bucket(bucket)?;
        validate_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

fn io_error(context: &str, e: std::io::Error) -> LeadflowError {
    LeadflowError::storage(context, e)
}

#[async_trait]
impl PluginAdapter for FsObjectStore {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ObjectStore
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        match tokio::fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                self.root.display()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "{}: {e}",
                self.root.display()
            ))),
        }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, LeadflowError> {
        let path = self.path_for(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(LeadflowError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(io_error("object read", e)),
        }
    }

    #[tracing::instrument(level = "debug", skip(self, body), fields(bytes = body.len()))]
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        _content_type: &str,
    ) -> Result<(), LeadflowError> {
        let path = self.path_for(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create object dir", e))?;
        }

        let staging = self
            .root
            .join(STAGING_DIR)
            .join(uuid::Uuid::new_v4().to_string());
        tokio::fs::write(&staging, &body)
            .await
            .map_err(|e| io_error("object write", e))?;
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(io_error("object rename", e));
        }

        debug!(path = %path.display(), "object written");
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, LeadflowError> {
        let path = self.path_for(bucket, key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("object stat", e)),
        }
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, LeadflowError> {
        validate_bucket(bucket)?;
        let base = self.root.join(bucket);
        let mut out = Vec::new();
        if tokio::fs::metadata(&base).await.is_err() {
            return Ok(out);
        }

        let mut stack = vec![base.clone()];
        while let Some(dir) = stack.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| io_error("list object dir", e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| io_error("list object dir", e))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| io_error("list object dir", e))?;
                if file_type.is_dir() {
                    stack.push(path);
                    continue;
                }
                let Ok(rel) = path.strip_prefix(&base) else {
                    continue;
                };
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if key.starts_with(prefix) {
                    out.push(key);
                }
            }
        }

        out.sort();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, FsObjectStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsObjectStore::new(dir.path().join("objects"))
            .await
            .expect("store");
        (dir, store)
    }

    #[tokio::test]
    async fn put_creates_nested_directories() {
        let (_dir, store) = store().await;
        let key = "crm/lead_enriched/dt=2024-05-01/lead_id=L1/enriched.json";
        store
            .put("curated", key, Bytes::from("{\"a\":1}"), "application/json")
            .await
            .expect("put");

        assert!(store.root().join("curated").join(key).is_file());
        assert_eq!(
            store.get("curated", key).await.expect("get"),
            Bytes::from("{\"a\":1}")
        );
        assert!(store.exists("curated", key).await.expect("exists"));
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let (_dir, store) = store().await;
        let err = store.get("curated", "nope.json").await.expect_err("missing");
        assert!(matches!(err, LeadflowError::NotFound { .. }));
        assert!(!store.exists("curated", "nope.json").await.expect("exists"));
    }

    #[tokio::test]
    async fn overwrite_leaves_no_staging_files() {
        let (_dir, store) = store().await;
        for body in ["one", "two"] {
            store
                .put("b", "k.json", Bytes::from(body), "application/json")
                .await
                .expect("put");
        }
        assert_eq!(store.get("b", "k.json").await.expect("get"), Bytes::from("two"));

        let mut staged = std::fs::read_dir(store.root().join(STAGING_DIR)).expect("staging");
        assert!(staged.next().is_none());
    }

    #[tokio::test]
    async fn list_walks_subdirectories_in_order() {
        let (_dir, store) = store().await;
        for key in ["p/2/x.json", "p/1/y.json", "q/z.json"] {
            store
                .put("b", key, Bytes::new(), "application/json")
                .await
                .expect("put");
        }
        assert_eq!(
            store.list("b", "p/").await.expect("list"),
            vec!["p/1/y.json", "p/2/x.json"]
        );
        assert_eq!(store.list("b", "").await.expect("list").len(), 3);
        assert!(store.list("empty", "").await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (_dir, store) = store().await;
        let err = store
            .put("b", "../escape.json", Bytes::new(), "application/json")
            .await
            .expect_err("traversal");
        assert!(matches!(err, LeadflowError::InvalidInput(_)));
    }
}
