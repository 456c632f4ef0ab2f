// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Faff messaging service.

use thiserror::Error;

/// The primary error type used across Faff services and store traits.
#[derive(Debug, Error)]
pub enum FaffError {
    /// Caller supplied input that fails validation (empty body, bad limit).
    #[error("invalid input: {0}")]
    InputInvalid(String),

    /// Credential missing, malformed, expired, or not matching a user.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write conflicts with existing state (duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage backend errors (connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors detected at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FaffError {
    /// Wraps any error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        FaffError::Storage {
            source: Box::new(err),
        }
    }
}

/// Failure modes of a single embedding request.
///
/// Callers treat every variant as "no vector"; the distinction only matters
/// for logging and for the retry policy.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Input was empty after normalisation; the provider was not called.
    #[error("no embeddable input")]
    NoInput,

    /// The client has no API token configured.
    #[error("embedding provider not configured: {0}")]
    NotConfigured(String),

    /// The provider answered with a non-success status.
    #[error("embedding provider returned {status}: {detail}")]
    Rejected { status: u16, detail: String },

    /// The request never produced an HTTP response.
    #[error("embedding transport error: {0}")]
    Transport(String),

    /// The provider answered 2xx but the body is not a numeric vector.
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),

    /// Every attempt failed with a retryable error.
    #[error("embedding provider unavailable after {attempts} attempts")]
    Unavailable { attempts: u32 },
}

impl EmbedError {
    /// True for rate limiting and transient upstream unavailability.
    pub fn is_retryable(&self) -> bool {
        match self {
            EmbedError::Rejected { status, detail } => {
                matches!(status, 429 | 502 | 503 | 504) || detail.to_ascii_lowercase().contains("rate")
            }
            _ => false,
        }
    }
}
