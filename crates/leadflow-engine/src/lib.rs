// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Enrichment engine for the leadflow pipeline.
//!
//! Consumes "raw object written" notifications, looks up each lead's owner,
//! and writes curated or error artifacts at deterministic keys. Collaborators
//! (object store, owner directory, notifier, message source) are injected as
//! trait objects from `leadflow-core`.

pub mod engine;
pub mod envelope;
pub mod ingest;
pub mod merge;
pub mod recording;
pub mod worker;

pub use engine::{
    Clock, EngineSettings, EnrichmentEngine, MessageReport, ObjectOutcome, ObjectReport,
    format_timestamp,
};
pub use envelope::{ObjectRef, decode_key, unwrap_envelope};
pub use ingest::{IngestReceipt, Ingestor};
pub use merge::merge;
pub use worker::{QueueWorker, WorkerStats};
