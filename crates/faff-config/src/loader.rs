// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./faff.toml` > `~/.config/faff/faff.toml` > `/etc/faff/faff.toml`
//! with environment variable overrides via the `FAFF_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FaffConfig;

/// Sections that `FAFF_<SECTION>_<KEY>` variables map into.
const SECTIONS: &[&str] = &[
    "server",
    "auth",
    "storage",
    "embedding",
    "backfill",
    "search",
    "log",
];

/// Unprefixed variables accepted for deployments that predate `FAFF_*`.
const BARE_ENV_KEYS: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("FRONTEND_URL", "server.frontend_url"),
    ("JWT_SECRET", "auth.jwt_secret"),
    ("HF_API_TOKEN", "embedding.api_token"),
    ("BACKFILL_BATCH_SIZE", "backfill.batch_size"),
    ("BACKFILL_SLEEP_MS", "backfill.sleep_ms"),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/faff/faff.toml` (system-wide)
/// 3. `~/.config/faff/faff.toml` (user XDG config)
/// 4. `./faff.toml` (local directory)
/// 5. Bare variables (`PORT`, `JWT_SECRET`, `HF_API_TOKEN`, ...)
/// 6. `FAFF_*` environment variables
pub fn load_config() -> Result<FaffConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<FaffConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FaffConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FaffConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FaffConfig::default()))
        .merge(Toml::file(path))
        .merge(bare_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FaffConfig::default()))
        .merge(Toml::file("/etc/faff/faff.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("faff/faff.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("faff.toml"))
        .merge(bare_env_provider())
        .merge(env_provider())
}

/// `FAFF_*` provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `FAFF_EMBEDDING_API_TOKEN` must map to `embedding.api_token`.
fn env_provider() -> Env {
    Env::prefixed("FAFF_").map(|key| {
        let key_str = key.as_str().to_ascii_lowercase();
        SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(*section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|field| format!("{section}.{field}"))
            })
            .unwrap_or(key_str)
            .into()
    })
}

/// Provider for the unprefixed variables in [`BARE_ENV_KEYS`].
fn bare_env_provider() -> Env {
    let names: Vec<&str> = BARE_ENV_KEYS.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        BARE_ENV_KEYS
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map(|(_, path)| (*path).to_string())
            .unwrap_or_else(|| key.as_str().to_string())
            .into()
    })
}
