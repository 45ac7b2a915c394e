// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object store backends for the leadflow pipeline.
//!
//! Two [`ObjectStore`] implementations live here: [`FsObjectStore`], which
//! maps buckets to directories under a root, and [`MemoryObjectStore`] for
//! tests and dry runs. The S3 backend lives in `leadflow-aws`.

pub mod fs;
pub mod json;
pub mod memory;

pub use fs::FsObjectStore;
pub use json::{JSON_CONTENT_TYPE, get_json, put_json};
pub use memory::MemoryObjectStore;

pub use leadflow_core::ObjectStore;

use leadflow_core::LeadflowError;

/// Rejects keys that could escape their bucket or are otherwise unusable.
///
/// Keys are relative, slash-separated paths with no empty, `.` or `..`
/// segments and no backslashes.
pub fn validate_key(key: &str) -> Result<(), LeadflowError> {
    if key.is_empty() {
        return Err(LeadflowError::InvalidInput("object key is empty".into()));
    }
    if key.starts_with('/') || key.contains('\\') {
        return Err(LeadflowError::InvalidInput(format!(
            "object key must be a relative path: {key}"
        )));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(LeadflowError::InvalidInput(format!(
            "object key has an empty or relative segment: {key}"
        )));
    }
    Ok(())
}

/// Same rules as keys, minus the slash: a bucket is one path segment.
/// Names starting with `.` are reserved for backend bookkeeping.
pub fn validate_bucket(bucket: &str) -> Result<(), LeadflowError> {
    if bucket.is_empty() || bucket.contains('/') || bucket.starts_with('.') {
        return Err(LeadflowError::InvalidInput(format!(
            "invalid bucket name: {bucket:?}"
        )));
    }
    validate_key(bucket)
}
