// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding generation for Faff messages.
//!
//! [`EmbeddingClient`] turns message text into vectors through a hosted
//! feature-extraction pipeline. Retry behaviour lives in [`retry`] and is
//! transport independent.

pub mod client;
pub mod response;
pub mod retry;

pub use client::EmbeddingClient;
pub use response::normalize_embedding_response;
pub use retry::{RetryError, RetryPolicy, retry_with_policy};
