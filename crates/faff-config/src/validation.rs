// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::FaffConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &FaffConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.auth.token_ttl_hours == 0 {
        fail("auth.token_ttl_hours must be greater than 0".to_string());
    }

    let embedding = &config.embedding;
    if embedding.api_url.trim().is_empty() {
        fail("embedding.api_url must not be empty".to_string());
    }
    if embedding.model.trim().is_empty() {
        fail("embedding.model must not be empty".to_string());
    }
    if embedding.dimensions == 0 {
        fail("embedding.dimensions must be greater than 0".to_string());
    }
    if embedding.max_attempts == 0 {
        fail("embedding.max_attempts must be at least 1".to_string());
    }
    if embedding.base_delay_ms > embedding.max_delay_ms {
        fail(format!(
            "embedding.base_delay_ms ({}) must not exceed embedding.max_delay_ms ({})",
            embedding.base_delay_ms, embedding.max_delay_ms
        ));
    }

    if config.backfill.batch_size == 0 {
        fail("backfill.batch_size must be greater than 0".to_string());
    }

    let search = &config.search;
    if search.default_limit == 0 || search.max_limit == 0 {
        fail("search.default_limit and search.max_limit must be greater than 0".to_string());
    } else if search.default_limit > search.max_limit {
        fail(format!(
            "search.default_limit ({}) must not exceed search.max_limit ({})",
            search.default_limit, search.max_limit
        ));
    }

    if !matches!(
        config.log.level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        fail(format!(
            "log.level `{}` must be one of trace, debug, info, warn, error",
            config.log.level
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
