// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret resolvers that need no external service.

use std::collections::HashMap;

use async_trait::async_trait;
use leadflow_core::{LeadflowError, SecretResolver};
use secrecy::{ExposeSecret, SecretString};

/// Treats the secret name as an environment variable name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretResolver;

#[async_trait]
impl SecretResolver for EnvSecretResolver {
    async fn resolve(&self, name: &str) -> Result<SecretString, LeadflowError> {
        std::env::var(name)
            .map(SecretString::from)
            .map_err(|e| LeadflowError::Secret {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}

/// Fixed name-to-value map.
#[derive(Default)]
pub struct StaticSecretResolver {
    secrets: HashMap<String, SecretString>,
}

impl StaticSecretResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets
            .insert(name.into(), SecretString::from(value.into()));
        self
    }
}

impl std::fmt::Debug for StaticSecretResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSecretResolver")
            .field("names", &self.secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl SecretResolver for StaticSecretResolver {
    async fn resolve(&self, name: &str) -> Result<SecretString, LeadflowError> {
        self.secrets
            .get(name)
            .map(|secret| SecretString::from(secret.expose_secret().to_string()))
            .ok_or_else(|| LeadflowError::Secret {
                name: name.to_string(),
                message: "no such secret".into(),
            })
    }
}
