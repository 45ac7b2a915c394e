// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! S3-backed object store.

use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use bytes::Bytes;
use leadflow_config::model::StorageConfig;
use leadflow_core::{AdapterType, HealthStatus, LeadflowError, ObjectStore, PluginAdapter};
use tracing::debug;

/// Object store over S3 buckets.
///
/// Writes are encrypted at rest with SSE-S3 (AES256). A single `PutObject`
/// replaces the whole object, which is what makes per-key rewrites safe.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Builds a client from the shared SDK config plus `[storage]` overrides.
    pub fn new(sdk_config: &aws_config::SdkConfig, config: &StorageConfig) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);

        if let Some(region) = &config.region {
            builder = builder.region(Region::new(region.clone()));
        }

        // Custom endpoints (LocalStack, MinIO) rarely support virtual-hosted buckets.
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        builder = builder.timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(config.timeout())
                .build(),
        );

        Self::from_client(Client::from_conf(builder.build()))
    }

    /// Wraps a pre-built client (tests, custom middleware).
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn s3_error<E>(operation: &str, bucket: &str, key: &str, err: SdkError<E>) -> LeadflowError
where
    E: std::error::Error + Send + Sync + 'static,
{
    if let SdkError::TimeoutError(_) = &err {
        debug!(operation, bucket, key, "s3 operation timed out");
    }
    LeadflowError::storage(
        format!(
            "s3 {operation} {bucket}/{key}: {}",
            DisplayErrorContext(&err)
        ),
        err,
    )
}

/// True when the raw HTTP response was a 404.
fn is_http_not_found<E>(err: &SdkError<E>) -> bool {
    err.raw_response()
        .is_some_and(|response| response.status().as_u16() == 404)
}

#[async_trait]
impl PluginAdapter for S3ObjectStore {
    fn name(&self) -> &str {
        "s3"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::ObjectStore
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        match self.client.list_buckets().send().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(
                DisplayErrorContext(&e).to_string(),
            )),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, LeadflowError> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .is_some_and(|e| e.is_no_such_key())
                    || is_http_not_found(&err);
                if missing {
                    return Err(LeadflowError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    });
                }
                return Err(s3_error("get_object", bucket, key, err));
            }
        };

        let data = response.body.collect().await.map_err(|e| {
            LeadflowError::storage(format!("s3 read body {bucket}/{key}"), e)
        })?;
        Ok(data.into_bytes())
    }

    #[tracing::instrument(level = "debug", skip(self, body), fields(bytes = body.len()))]
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), LeadflowError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .server_side_encryption(ServerSideEncryption::Aes256)
            .send()
            .await
            .map_err(|e| s3_error("put_object", bucket, key, e))?;
        Ok(())
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool, LeadflowError> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let missing = err.as_service_error().is_some_and(|e| e.is_not_found())
                    || is_http_not_found(&err);
                if missing {
                    Ok(false)
                } else {
                    Err(s3_error("head_object", bucket, key, err))
                }
            }
        }
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, LeadflowError> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket).prefix(prefix);
            if let Some(t) = token.take() {
                request = request.continuation_token(t);
            }
            let response = request
                .send()
                .await
                .map_err(|e| s3_error("list_objects_v2", bucket, prefix, e))?;

            keys.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(String::from)),
            );

            match response.next_continuation_token() {
                Some(next) => token = Some(next.to_string()),
                None => break,
            }
        }
        keys.sort();
        Ok(keys)
    }
}
