// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON helpers over any [`ObjectStore`].

use bytes::Bytes;
use leadflow_core::{LeadflowError, ObjectStore};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Serializes `value` as compact JSON and writes it.
pub async fn put_json<T: Serialize + ?Sized>(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    value: &T,
) -> Result<(), LeadflowError> {
    let body = serde_json::to_vec(value)?;
    store
        .put(bucket, key, Bytes::from(body), JSON_CONTENT_TYPE)
        .await
}

/// Reads and decodes a JSON object.
///
/// Decode failures surface as [`LeadflowError::RawDecode`] carrying the key.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<T, LeadflowError> {
    let data = store.get(bucket, key).await?;
    serde_json::from_slice(&data).map_err(|source| LeadflowError::RawDecode {
        key: key.to_string(),
        source,
    })
}
