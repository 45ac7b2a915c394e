// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound notifications for enriched leads.
//!
//! The engine treats every notification as best effort: [`WebhookNotifier`]
//! reports failures as errors, and the engine logs and drops them.

pub mod message;
pub mod resolver;
pub mod target;
pub mod webhook;

pub use message::summary_message;
pub use resolver::{EnvSecretResolver, StaticSecretResolver};
pub use target::{WebhookTarget, parse_webhook_secret};
pub use webhook::WebhookNotifier;
