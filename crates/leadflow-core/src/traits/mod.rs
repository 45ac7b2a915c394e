// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the pipeline's external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility. The engine receives
//! every collaborator as an `Arc<dyn Trait>` through its constructor.

pub mod adapter;
pub mod directory;
pub mod notifier;
pub mod queue;
pub mod secrets;
pub mod storage;

pub use adapter::PluginAdapter;
pub use directory::OwnerDirectory;
pub use notifier::Notifier;
pub use queue::{Delivery, MessageSource};
pub use secrets::SecretResolver;
pub use storage::ObjectStore;
