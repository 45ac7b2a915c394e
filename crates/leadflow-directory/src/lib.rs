// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner directory adapters.
//!
//! [`HttpOwnerDirectory`] performs one `GET <base>/<lead_id>.json` per call
//! and reports failures as [`LookupError`](leadflow_core::LookupError)s.
//! [`RetryingDirectory`] wraps any [`OwnerDirectory`] with the local retry
//! budget for transient and unknown failures.

pub mod client;
pub mod retry;

pub use client::HttpOwnerDirectory;
pub use retry::{RetryPolicy, RetryingDirectory};

pub use leadflow_core::OwnerDirectory;
