// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AWS collaborators for the leadflow pipeline.
//!
//! - [`S3ObjectStore`]: raw, curated and error artifacts
//! - [`SqsSource`]: deliveries of object-created notifications
//! - [`SecretsManagerResolver`]: the webhook secret
//!
//! All clients are built from one shared [`aws_config::SdkConfig`] so
//! credentials and region resolution happen once at startup.

pub mod s3;
pub mod secrets;
pub mod sqs;

use aws_config::BehaviorVersion;

pub use aws_config::SdkConfig;
pub use s3::S3ObjectStore;
pub use secrets::SecretsManagerResolver;
pub use sqs::SqsSource;

/// Loads the shared SDK configuration from the default provider chain.
///
/// `region` overrides the chain's region. No operation timeout is set here:
/// each client applies its own, since a long-polling receive and an S3 put
/// need very different bounds.
pub async fn load_sdk_config(region: Option<&str>) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(aws_config::Region::new(region.to_string()));
    }
    loader.load().await
}
