// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic embedding adapter for tests.
//!
//! `MockEmbedder` hashes words into buckets and L2-normalizes the counts, so
//! texts sharing words land close together under cosine distance. Failure
//! behaviour can be switched at runtime to simulate provider outages.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use faff_core::traits::adapter::PluginAdapter;
use faff_core::traits::embedding::EmbeddingAdapter;
use faff_core::types::{AdapterType, HealthStatus};
use faff_core::{EmbedError, FaffError};

/// Default vector length, matching the production model.
pub const MOCK_DIMENSIONS: usize = 384;

/// How the mock should fail, if at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureMode {
    /// Always return a vector.
    Never,
    /// Every call fails as if retries were exhausted.
    Always,
    /// The next `n` calls fail, then calls succeed.
    Next(u32),
    /// Calls whose text contains the needle fail.
    WhenContains(String),
}

/// A mock embedding provider with call capture.
pub struct MockEmbedder {
    dimensions: usize,
    failure: Arc<Mutex<FailureMode>>,
    calls: AtomicUsize,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl MockEmbedder {
    /// A mock producing [`MOCK_DIMENSIONS`]-length vectors that never fails.
    pub fn new() -> Self {
        Self::with_dimensions(MOCK_DIMENSIONS)
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            failure: Arc::new(Mutex::new(FailureMode::Never)),
            calls: AtomicUsize::new(0),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A mock that fails every call.
    pub fn failing() -> Self {
        Self {
            failure: Arc::new(Mutex::new(FailureMode::Always)),
            ..Self::new()
        }
    }

    /// Change the failure behaviour for subsequent calls.
    pub async fn set_failure(&self, mode: FailureMode) {
        *self.failure.lock().await = mode;
    }

    /// Number of `embed` calls so far, successful or not.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every text passed to `embed`, in call order.
    pub async fn inputs(&self) -> Vec<String> {
        self.inputs.lock().await.clone()
    }

    /// The vector this mock returns for `text`, bypassing failure modes.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        bag_of_words(text, self.dimensions)
    }

    async fn should_fail(&self, text: &str) -> bool {
        let mut failure = self.failure.lock().await;
        match &mut *failure {
            FailureMode::Never => false,
            FailureMode::Always => true,
            FailureMode::Next(remaining) => {
                if *remaining == 0 {
                    false
                } else {
                    *remaining -= 1;
                    true
                }
            }
            FailureMode::WhenContains(needle) => text.contains(needle.as_str()),
        }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash each lowercase word into a bucket, count, then L2-normalize.
fn bag_of_words(text: &str, dimensions: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dimensions];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let bucket = fnv1a(&word.to_lowercase()) as usize % dimensions;
        vector[bucket] += 1.0;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    } else {
        // Punctuation-only input still gets a valid unit vector.
        vector[0] = 1.0;
    }
    vector
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, FaffError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FaffError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().await.push(text.to_string());

        if text.trim().is_empty() {
            return Err(EmbedError::NoInput);
        }
        if self.should_fail(text).await {
            return Err(EmbedError::Unavailable { attempts: 3 });
        }
        Ok(bag_of_words(text, self.dimensions))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
