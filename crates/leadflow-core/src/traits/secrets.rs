// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret resolution trait.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::LeadflowError;

/// Opaque key/value lookup for secrets referenced by name.
#[async_trait]
pub trait SecretResolver: Send + Sync + 'static {
    /// Resolves the secret string stored under `name`.
    async fn resolve(&self, name: &str) -> Result<SecretString, LeadflowError>;
}
