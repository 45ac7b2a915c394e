// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the configured collaborators.
//!
//! Every command goes through [`AdapterFactory`] so `serve`, `process` and
//! `check` see the same store, directory and notifier for a given config.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leadflow_config::LeadflowConfig;
use leadflow_config::model::{SecretsBackend, StorageBackend};
use leadflow_core::{
    AdapterType, HealthStatus, LeadflowError, LookupError, MessageSource, Notifier, ObjectStore,
    OwnerDirectory, OwnerRecord, PluginAdapter, SecretResolver,
};
use leadflow_directory::{HttpOwnerDirectory, RetryPolicy, RetryingDirectory};
use leadflow_engine::{EngineSettings, EnrichmentEngine, Ingestor};
use leadflow_notify::{EnvSecretResolver, WebhookNotifier};
use leadflow_storage::FsObjectStore;
use tracing::{debug, info};

/// Lazily builds adapters from one configuration.
///
/// The AWS SDK configuration is loaded at most once, on first use.
pub struct AdapterFactory {
    config: LeadflowConfig,
    #[cfg(feature = "aws")]
    sdk: tokio::sync::OnceCell<leadflow_aws::SdkConfig>,
}

impl AdapterFactory {
    pub fn new(config: LeadflowConfig) -> Self {
        Self {
            config,
            #[cfg(feature = "aws")]
            sdk: tokio::sync::OnceCell::new(),
        }
    }

    pub fn config(&self) -> &LeadflowConfig {
        &self.config
    }

    #[cfg(feature = "aws")]
    async fn sdk(&self) -> &leadflow_aws::SdkConfig {
        self.sdk.get_or_init(|| leadflow_aws::load_sdk_config(None)).await
    }

    pub async fn object_store(&self) -> Result<Arc<dyn ObjectStore>, LeadflowError> {
        match self.config.storage.backend {
            StorageBackend::Filesystem => {
                let store = FsObjectStore::new(self.config.storage.root.as_str()).await?;
                info!(root = %self.config.storage.root, "using filesystem object store");
                Ok(Arc::new(store))
            }
            StorageBackend::S3 => self.s3_store().await,
        }
    }

    #[cfg(feature = "aws")]
    async fn s3_store(&self) -> Result<Arc<dyn ObjectStore>, LeadflowError> {
        let store = leadflow_aws::S3ObjectStore::new(self.sdk().await, &self.config.storage);
        info!("using S3 object store");
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "aws"))]
    async fn s3_store(&self) -> Result<Arc<dyn ObjectStore>, LeadflowError> {
        Err(without_aws("storage.backend = \"s3\""))
    }

    pub async fn secret_resolver(&self) -> Result<Arc<dyn SecretResolver>, LeadflowError> {
        match self.config.secrets.backend {
            SecretsBackend::Env => Ok(Arc::new(EnvSecretResolver)),
            SecretsBackend::Aws => self.secrets_manager().await,
        }
    }

    #[cfg(feature = "aws")]
    async fn secrets_manager(&self) -> Result<Arc<dyn SecretResolver>, LeadflowError> {
        Ok(Arc::new(leadflow_aws::SecretsManagerResolver::new(
            self.sdk().await,
            &self.config.secrets,
        )))
    }

    #[cfg(not(feature = "aws"))]
    async fn secrets_manager(&self) -> Result<Arc<dyn SecretResolver>, LeadflowError> {
        Err(without_aws("secrets.backend = \"aws\""))
    }

    /// The owner directory with the configured retry policy applied.
    ///
    /// With lookups skipped the engine never calls it, so no endpoint is needed.
    pub fn owner_directory(&self) -> Result<Arc<dyn OwnerDirectory>, LeadflowError> {
        let enrichment = &self.config.enrichment;
        if enrichment.skip_owner_lookup {
            debug!("owner lookups disabled");
            return Ok(Arc::new(DisabledDirectory));
        }

        let base = enrichment
            .owner_base
            .as_deref()
            .ok_or_else(|| LeadflowError::Config("enrichment.owner_base is required".into()))?;
        let client = HttpOwnerDirectory::new(base, enrichment.lookup_timeout())?;
        let policy = RetryPolicy {
            retry_transient: enrichment.retry_transient,
            backoff_base: Duration::from_millis(enrichment.backoff_base_ms),
            backoff_jitter: Duration::from_millis(enrichment.backoff_jitter_ms),
        };
        Ok(Arc::new(RetryingDirectory::new(client, policy)))
    }

    pub async fn notifier(&self) -> Result<Arc<dyn Notifier>, LeadflowError> {
        let resolver = self.secret_resolver().await?;
        let notifier = WebhookNotifier::from_config(&self.config.notify, resolver)?;
        if notifier.target().is_disabled() {
            info!("no webhook configured, notifications disabled");
        }
        Ok(Arc::new(notifier))
    }

    #[cfg(feature = "aws")]
    pub async fn message_source(&self) -> Result<Arc<dyn MessageSource>, LeadflowError> {
        let source = leadflow_aws::SqsSource::new(self.sdk().await, &self.config.queue)?;
        info!(queue_url = source.queue_url(), "using SQS message source");
        Ok(Arc::new(source))
    }

    #[cfg(not(feature = "aws"))]
    pub async fn message_source(&self) -> Result<Arc<dyn MessageSource>, LeadflowError> {
        Err(without_aws("the queue consumer"))
    }

    pub async fn engine(&self, store: Arc<dyn ObjectStore>) -> Result<EnrichmentEngine, LeadflowError> {
        let settings = EngineSettings::from_config(&self.config)?;
        Ok(EnrichmentEngine::new(
            store,
            self.owner_directory()?,
            Some(self.notifier().await?),
            settings,
        ))
    }

    pub fn ingestor(&self, store: Arc<dyn ObjectStore>) -> Result<Ingestor, LeadflowError> {
        let raw_bucket = self
            .config
            .storage
            .raw_bucket
            .clone()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| LeadflowError::Config("storage.raw_bucket is required to ingest".into()))?;
        Ok(Ingestor::new(store, raw_bucket, self.config.storage.timeout()))
    }
}

#[cfg(not(feature = "aws"))]
fn without_aws(what: &str) -> LeadflowError {
    LeadflowError::Config(format!("{what} requires leadflow built with the `aws` feature"))
}

/// Directory used when owner lookups are switched off.
struct DisabledDirectory;

#[async_trait]
impl PluginAdapter for DisabledDirectory {
    fn name(&self) -> &str {
        "disabled-directory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Directory
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadflowError> {
        Ok(HealthStatus::Degraded("owner lookups are skipped".into()))
    }
}

#[async_trait]
impl OwnerDirectory for DisabledDirectory {
    async fn lookup(&self, _lead_id: &str) -> Result<OwnerRecord, LookupError> {
        Err(LookupError::Other {
            message: "owner lookups are disabled".into(),
        })
    }
}
