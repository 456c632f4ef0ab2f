// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Faff messaging service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Development-only JWT secret used when none is configured.
pub const INSECURE_DEV_JWT_SECRET: &str = "dev-insecure-secret-change-me";

/// Top-level Faff configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FaffConfig {
    /// HTTP and WebSocket listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Token issuing and password policy.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Embedding provider and retry policy.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Embedding backfill job pacing.
    #[serde(default)]
    pub backfill: BackfillConfig,

    /// Semantic search limits.
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// HTTP and WebSocket listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin allowed by CORS, the browser client's URL.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_url: default_frontend_url(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

/// Token issuing and password policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// HMAC secret for session tokens. Falls back to an insecure development
    /// value (with a warning) when unset.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Lifetime of issued tokens in hours.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,

    /// Minimum password length accepted at registration.
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
            min_password_len: default_min_password_len(),
        }
    }
}

impl AuthConfig {
    /// The configured secret, or the development fallback.
    pub fn effective_jwt_secret(&self) -> &str {
        self.jwt_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(INSECURE_DEV_JWT_SECRET)
    }

    /// True when no secret was configured and the fallback is in use.
    pub fn uses_insecure_secret(&self) -> bool {
        self.effective_jwt_secret() == INSECURE_DEV_JWT_SECRET
    }
}

fn default_token_ttl_hours() -> u64 {
    24 * 7
}

fn default_min_password_len() -> usize {
    6
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("faff").join("faff.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("faff.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Embedding provider configuration and retry policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Base URL of the inference router. The model path is appended.
    #[serde(default = "default_embedding_api_url")]
    pub api_url: String,

    /// Feature-extraction model id.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Bearer token for the provider. Without it every embed call fails fast.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Dimensionality of the model's output vectors.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Total attempts per embed call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the first retry; doubles per attempt.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound for a single backoff wait.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_url: default_embedding_api_url(),
            model: default_embedding_model(),
            api_token: None,
            dimensions: default_dimensions(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_embedding_api_url() -> String {
    "https://router.huggingface.co/hf-inference/models".to_string()
}

fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    2000
}

fn default_max_delay_ms() -> u64 {
    15_000
}

fn default_timeout_secs() -> u64 {
    30
}

/// Backfill job pacing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackfillConfig {
    /// Rows fetched per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Delay after each row, to stay under provider rate limits.
    #[serde(default = "default_sleep_ms")]
    pub sleep_ms: u64,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            sleep_ms: default_sleep_ms(),
        }
    }
}

fn default_batch_size() -> usize {
    100
}

fn default_sleep_ms() -> u64 {
    100
}

/// Semantic search limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Result count when the caller gives none.
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,

    /// Upper bound applied to caller-supplied limits.
    #[serde(default = "default_max_search_limit")]
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_search_limit(),
            max_limit: default_max_search_limit(),
        }
    }
}

fn default_search_limit() -> usize {
    10
}

fn default_max_search_limit() -> usize {
    50
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Default level for the `faff` targets; `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
