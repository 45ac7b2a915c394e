// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./leadflow.toml` > `~/.config/leadflow/leadflow.toml`
//! > `/etc/leadflow/leadflow.toml`, with environment variable overrides via the
//! `LEADFLOW_` prefix and the bare deployment variables (`OWNER_BASE`,
//! `CURATED_BUCKET`, ...) that the hosting environment sets.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use tracing::debug;

use crate::model::LeadflowConfig;

/// Config sections addressable through `LEADFLOW_<SECTION>_<KEY>`.
const SECTIONS: &[&str] = &[
    "enrichment",
    "storage",
    "notify",
    "secrets",
    "queue",
    "metrics",
    "log",
];

/// Unprefixed deployment variables and the config keys they set.
pub const BARE_ENV_KEYS: &[(&str, &str)] = &[
    ("SKIP_OWNER_LOOKUP", "enrichment.skip_owner_lookup"),
    ("OWNER_BASE", "enrichment.owner_base"),
    ("RAW_BUCKET", "storage.raw_bucket"),
    ("CURATED_BUCKET", "storage.curated_bucket"),
    ("ERROR_BUCKET", "storage.error_bucket"),
    ("SLACK_SECRET_NAME", "notify.secret_name"),
    ("SLACK_WEBHOOK_URL", "notify.webhook_url"),
    ("SQS_QUEUE_URL", "queue.queue_url"),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/leadflow/leadflow.toml` (system-wide)
/// 3. `~/.config/leadflow/leadflow.toml` (user XDG config)
/// 4. `./leadflow.toml` (local directory)
/// 5. `LEADFLOW_*` environment variables
/// 6. Bare deployment variables ([`BARE_ENV_KEYS`])
pub fn load_config() -> Result<LeadflowConfig, figment::Error> {
    debug!("loading configuration from the XDG hierarchy");
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LeadflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadflowConfig, figment::Error> {
    debug!(path = %path.display(), "loading configuration file");
    Figment::new()
        .merge(Serialized::defaults(LeadflowConfig::default()))
        .merge(Toml::file(path))
        .merge(prefixed_env())
        .merge(bare_env())
        .extract()
}

/// Build the Figment used for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LeadflowConfig::default()))
        .merge(Toml::file("/etc/leadflow/leadflow.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("leadflow/leadflow.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("leadflow.toml"))
        .merge(prefixed_env())
        .merge(bare_env())
}

/// `LEADFLOW_STORAGE_ERROR_BUCKET` -> `storage.error_bucket`.
///
/// Maps on known section names instead of `Env::split("_")`, since key names
/// themselves contain underscores.
fn prefixed_env() -> Env {
    Env::prefixed("LEADFLOW_").map(|key| section_key(&key.as_str().to_ascii_lowercase()).into())
}

fn bare_env() -> Env {
    let names: Vec<&str> = BARE_ENV_KEYS.iter().map(|(env, _)| *env).collect();
    Env::raw().only(&names).map(|key| {
        let key = key.as_str();
        BARE_ENV_KEYS
            .iter()
            .find(|(env, _)| env.eq_ignore_ascii_case(key))
            .map(|(_, path)| (*path).to_string())
            .unwrap_or_else(|| key.to_ascii_lowercase())
            .into()
    })
}

/// Turns `section_rest_of_key` into `section.rest_of_key` for known sections.
pub(crate) fn section_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_key_splits_on_first_known_section_only() {
        assert_eq!(section_key("storage_error_bucket"), "storage.error_bucket");
        assert_eq!(
            section_key("enrichment_skip_owner_lookup"),
            "enrichment.skip_owner_lookup"
        );
        assert_eq!(section_key("queue_max_receive_count"), "queue.max_receive_count");
        assert_eq!(section_key("log_level"), "log.level");
        assert_eq!(section_key("unknown_thing"), "unknown_thing");
    }
}
