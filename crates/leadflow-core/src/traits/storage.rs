// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object store trait for raw inputs and curated/error outputs.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::LeadflowError;
use crate::traits::adapter::PluginAdapter;

/// Key/value blob store with read-after-write consistency per key.
///
/// Implementations must make `put` all-or-nothing: a reader sees either the
/// previous object or the complete new one, never a partial write. Repeating
/// a `put` with the same inputs is always safe (last write wins).
#[async_trait]
pub trait ObjectStore: PluginAdapter {
    /// Reads an entire object.
    ///
    /// Returns [`LeadflowError::NotFound`] if the object doesn't exist.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, LeadflowError>;

    /// Writes an object, replacing any previous version.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), LeadflowError>;

    /// Returns whether an object exists at the key.
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, LeadflowError>;

    /// Lists keys under a prefix, sorted lexicographically.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, LeadflowError>;
}
