// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner-lookup failure taxonomy.
//!
//! [`classify`] maps a [`LookupError`] onto the three-way [`ErrorClass`]
//! split that decides whether a failure is absorbed (error artifact, message
//! consumed) or escalated (queue redelivery).

use std::time::Duration;

use strum::Display;
use thiserror::Error;

/// A failed call to the owner directory.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// The directory answered with a non-success HTTP status.
    #[error("owner directory returned HTTP {status}")]
    Status { status: u16, body: String },

    /// No response within the request timeout.
    #[error("owner lookup timed out after {after:?}")]
    Timeout { after: Duration },

    /// Connection-level failure (DNS, refused, reset).
    #[error("owner directory unreachable: {message}")]
    Connect { message: String },

    /// A 2xx response whose body was not usable JSON.
    #[error("owner directory response could not be decoded: {message}")]
    Decode { message: String },

    /// Anything the client could not attribute to one of the above.
    #[error("owner lookup failed: {message}")]
    Other { message: String },
}

impl LookupError {
    /// Stable name of the failure kind, recorded as `permanent:<kind>`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "HttpStatus",
            Self::Timeout { .. } => "Timeout",
            Self::Connect { .. } => "Connect",
            Self::Decode { .. } => "Decode",
            Self::Other { .. } => "Other",
        }
    }
}

/// Retry classification of a lookup failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorClass {
    /// Will not heal on retry (4xx: bad identifier, denied, not found).
    Permanent,
    /// Infrastructure hiccup (5xx, timeout, connection failure).
    Transient,
    /// Unrecognized. Callers treat it as transient.
    Unknown,
}

impl ErrorClass {
    /// Transient and unknown failures are worth another attempt.
    pub fn is_retryable(self) -> bool {
        match self {
            Self::Permanent => false,
            Self::Transient | Self::Unknown => true,
        }
    }
}

/// Classifies a lookup failure by HTTP-style status semantics.
pub fn classify(err: &LookupError) -> ErrorClass {
    match err {
        LookupError::Status { status, .. } => match status {
            400..=499 => ErrorClass::Permanent,
            500..=599 => ErrorClass::Transient,
            _ => ErrorClass::Unknown,
        },
        LookupError::Timeout { .. } | LookupError::Connect { .. } => ErrorClass::Transient,
        LookupError::Decode { .. } | LookupError::Other { .. } => ErrorClass::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> LookupError {
        LookupError::Status {
            status: code,
            body: String::new(),
        }
    }

    #[test]
    fn client_errors_are_permanent() {
        for code in [400, 403, 404, 410, 422, 499] {
            assert_eq!(classify(&status(code)), ErrorClass::Permanent, "HTTP {code}");
        }
    }

    #[test]
    fn server_errors_are_transient() {
        for code in [500, 502, 503, 504, 599] {
            assert_eq!(classify(&status(code)), ErrorClass::Transient, "HTTP {code}");
        }
    }

    #[test]
    fn network_failures_are_transient() {
        let timeout = LookupError::Timeout {
            after: Duration::from_secs(5),
        };
        let refused = LookupError::Connect {
            message: "connection refused".into(),
        };
        assert_eq!(classify(&timeout), ErrorClass::Transient);
        assert_eq!(classify(&refused), ErrorClass::Transient);
    }

    #[test]
    fn unrecognized_failures_are_unknown_and_retryable() {
        let decode = LookupError::Decode {
            message: "expected value at line 1".into(),
        };
        let other = LookupError::Other {
            message: "boom".into(),
        };
        let redirect = status(302);

        for err in [decode, other, redirect] {
            let class = classify(&err);
            assert_eq!(class, ErrorClass::Unknown);
            assert!(class.is_retryable());
        }
        assert!(!ErrorClass::Permanent.is_retryable());
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(status(404).kind(), "HttpStatus");
        assert_eq!(
            LookupError::Timeout {
                after: Duration::from_secs(1)
            }
            .kind(),
            "Timeout"
        );
        assert_eq!(ErrorClass::Permanent.to_string(), "permanent");
    }
}
