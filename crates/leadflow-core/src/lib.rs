// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the leadflow enrichment pipeline.
//!
//! This crate provides the domain types, object-key layout, lookup error
//! taxonomy, and the adapter traits every collaborator (object store, owner
//! directory, notifier, secret resolver, message source) implements.

pub mod error;
pub mod keys;
pub mod lookup;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LeadflowError;
pub use keys::LeadKey;
pub use lookup::{classify, ErrorClass, LookupError};
pub use types::{
    AdapterType, EnrichedLead, ErrorArtifact, HealthStatus, LookupStatus, NotifyReceipt,
    OwnerRecord, RawEvent, text_value,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    Delivery, MessageSource, Notifier, ObjectStore, OwnerDirectory, PluginAdapter,
    SecretResolver,
};
