// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for leadflow integration tests.
//!
//! Provides scripted collaborators (owner directory, notifier, queue) and a
//! [`TestHarness`] that wires them into an [`EnrichmentEngine`] over an
//! in-memory object store.
//!
//! [`EnrichmentEngine`]: leadflow_engine::EnrichmentEngine

pub mod fixtures;
pub mod harness;
pub mod memory_queue;
pub mod mock_directory;
pub mod mock_notifier;
pub mod stalling_store;

pub use fixtures::{fanout_body, raw_event, s3_event_body, stepping_clock};
pub use harness::{CURATED_BUCKET, ERROR_BUCKET, RAW_BUCKET, TestHarness, TestHarnessBuilder};
pub use memory_queue::MemoryQueue;
pub use mock_directory::MockDirectory;
pub use mock_notifier::RecordingNotifier;
pub use stalling_store::StallingStore;
