// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the leadflow pipeline.

use thiserror::Error;

use crate::lookup::{ErrorClass, LookupError};

/// The primary error type used across all leadflow adapters and the engine.
///
/// Anything the engine returns to its caller is a delivery-level failure:
/// the queue message must not be acknowledged and will be redelivered.
/// Failures the engine absorbs (skips, permanent lookup failures,
/// notification errors) never surface as this type.
#[derive(Debug, Error)]
pub enum LeadflowError {
    /// Configuration errors (missing required values, invalid URLs, bad backends).
    #[error("configuration error: {0}")]
    Config(String),

    /// Object store errors (I/O, permission, backend failure).
    #[error("storage error: {message}")]
    Storage {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The requested object does not exist.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The outer queue message body could not be parsed.
    #[error("malformed queue message: {source}")]
    EnvelopeParse { source: serde_json::Error },

    /// A raw object referenced by a notification is not valid JSON.
    #[error("raw object {key} is not valid JSON: {source}")]
    RawDecode {
        key: String,
        source: serde_json::Error,
    },

    /// An artifact could not be serialized.
    #[error("failed to encode artifact: {0}")]
    Encode(#[from] serde_json::Error),

    /// Caller-supplied input was rejected (capture path).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Owner lookup failed with a retryable class after the local budget ran out.
    #[error("owner lookup for lead {lead_id} failed ({class}): {source}")]
    TransientLookup {
        lead_id: String,
        class: ErrorClass,
        source: LookupError,
    },

    /// Outbound notification failed (absorbed by the engine, surfaced by notifiers).
    #[error("notification failed: {message}")]
    Notify {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A secret reference could not be resolved.
    #[error("secret lookup failed for {name}: {message}")]
    Secret { name: String, message: String },

    /// Message source errors (receive or acknowledge failures).
    #[error("queue error: {message}")]
    Queue {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LeadflowError {
    /// Wraps a backend error as a storage failure.
    pub fn storage(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether redelivering the same message could succeed.
    ///
    /// Configuration errors, rejected input, and unparseable queue messages
    /// fail identically on every attempt.
    pub fn is_redeliverable(&self) -> bool {
        !matches!(
            self,
            Self::Config(_) | Self::InvalidInput(_) | Self::EnvelopeParse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_lookup_message_names_lead_and_class() {
        let err = LeadflowError::TransientLookup {
            lead_id: "lead_42".into(),
            class: ErrorClass::Unknown,
            source: LookupError::Decode {
                message: "expected value".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("lead_42"), "got: {msg}");
        assert!(msg.contains("unknown"), "got: {msg}");
    }

    #[test]
    fn config_and_input_errors_are_not_redeliverable() {
        assert!(!LeadflowError::Config("x".into()).is_redeliverable());
        assert!(!LeadflowError::InvalidInput("x".into()).is_redeliverable());
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!LeadflowError::EnvelopeParse { source: parse }.is_redeliverable());
        assert!(LeadflowError::Timeout {
            duration: std::time::Duration::from_secs(1)
        }
        .is_redeliverable());
    }
}
