// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secrets Manager resolver.

use async_trait::async_trait;
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::config::Region;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use leadflow_config::model::SecretsConfig;
use leadflow_core::{LeadflowError, SecretResolver};
use secrecy::SecretString;

/// Resolves secret names (or ARNs) through AWS Secrets Manager.
///
/// Binary secrets are accepted when they hold UTF-8 text.
#[derive(Debug, Clone)]
pub struct SecretsManagerResolver {
    client: Client,
}

impl SecretsManagerResolver {
    pub fn new(sdk_config: &aws_config::SdkConfig, config: &SecretsConfig) -> Self {
        let mut builder = aws_sdk_secretsmanager::config::Builder::from(sdk_config);
        if let Some(region) = &config.region {
            builder = builder.region(Region::new(region.clone()));
        }
        Self::from_client(Client::from_conf(builder.build()))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretResolver for SecretsManagerResolver {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn resolve(&self, name: &str) -> Result<SecretString, LeadflowError> {
        let secret_error = |message: String| LeadflowError::Secret {
            name: name.to_string(),
            message,
        };

        let response = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| secret_error(DisplayErrorContext(&e).to_string()))?;

        if let Some(text) = response.secret_string() {
            return Ok(SecretString::from(text.to_string()));
        }

        let binary = response
            .secret_binary()
            .ok_or_else(|| secret_error("secret has no value".into()))?;
        let text = String::from_utf8(binary.clone().into_inner())
            .map_err(|_| secret_error("binary secret is not UTF-8".into()))?;
        Ok(SecretString::from(text))
    }
}
