// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for turning message text into vectors.

use async_trait::async_trait;

use crate::error::EmbedError;
use crate::traits::adapter::PluginAdapter;

/// Adapter that maps text to a fixed-length vector.
///
/// Implementations own their retry policy. A returned error always means
/// "no vector" to the caller; it is never surfaced to end users.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Embeds a single piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Dimensionality of the vectors this adapter produces.
    fn dimensions(&self) -> usize;
}
