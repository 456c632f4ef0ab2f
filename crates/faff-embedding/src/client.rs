// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a hosted feature-extraction pipeline.
//!
//! Provides [`EmbeddingClient`], which normalises input, authenticates with a
//! bearer token, retries rate limiting and transient unavailability with
//! exponential backoff, and decodes nested vector responses.

use std::time::Duration;

use async_trait::async_trait;
use faff_config::model::EmbeddingConfig;
use faff_core::{AdapterType, EmbedError, EmbeddingAdapter, FaffError, HealthStatus, PluginAdapter};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::{debug, warn};

use crate::response::{error_detail, normalize_embedding_response};
use crate::retry::{RetryError, RetryPolicy, retry_with_policy};

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
}

/// Embedding client for `{api_url}/{model}/pipeline/feature-extraction`.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_token: Option<String>,
    dimensions: usize,
    policy: RetryPolicy,
}

impl EmbeddingClient {
    /// Build a client from configuration.
    ///
    /// A missing API token is not an error here: the client is still created
    /// and every `embed` call fails fast with `NotConfigured`.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, FaffError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("x-wait-for-model", HeaderValue::from_static("true"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FaffError::Config(format!("failed to build HTTP client: {e}")))?;

        let api_token = config
            .api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        if api_token.is_none() {
            warn!("embedding.api_token is not set; messages will be stored without vectors");
        }

        Ok(Self {
            client,
            endpoint: format!(
                "{}/{}/pipeline/feature-extraction",
                config.api_url.trim_end_matches('/'),
                config.model
            ),
            model: config.model.clone(),
            api_token,
            dimensions: config.dimensions,
            policy: RetryPolicy::from_config(config),
        })
    }

    /// Overrides the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The model this client requests vectors from.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// One HTTP round trip, without retry.
    async fn request_once(&self, token: &str, input: &str) -> Result<Vec<f32>, EmbedError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&FeatureExtractionRequest { inputs: input })
            .send()
            .await
            .map_err(|e| EmbedError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(status = %status, "feature-extraction response received");

        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(EmbedError::Rejected {
                status: status.as_u16(),
                detail: error_detail(&raw),
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| EmbedError::MalformedResponse(e.to_string()))?;
        let vector = normalize_embedding_response(body)?;

        if vector.len() != self.dimensions {
            return Err(EmbedError::MalformedResponse(format!(
                "expected {} dimensions, got {}",
                self.dimensions,
                vector.len()
            )));
        }
        Ok(vector)
    }
}

/// Collapse newlines into spaces; `None` when nothing embeddable remains.
pub fn normalize_input(text: &str) -> Option<String> {
    let input = text.replace(['\r', '\n'], " ");
    (!input.trim().is_empty()).then_some(input)
}

#[async_trait]
impl PluginAdapter for EmbeddingClient {
    fn name(&self) -> &str {
        "hf-feature-extraction"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, FaffError> {
        Ok(match self.api_token {
            Some(_) => HealthStatus::Healthy,
            None => HealthStatus::Degraded("no API token configured".into()),
        })
    }

    async fn shutdown(&self) -> Result<(), FaffError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let Some(input) = normalize_input(text) else {
            return Err(EmbedError::NoInput);
        };
        let Some(token) = self.api_token.as_deref() else {
            return Err(EmbedError::NotConfigured("embedding.api_token is not set".into()));
        };

        let result = retry_with_policy(&self.policy, EmbedError::is_retryable, |_| {
            self.request_once(token, &input)
        })
        .await;

        match result {
            Ok(vector) => {
                metrics::counter!("faff_embedding_requests_total", "outcome" => "success")
                    .increment(1);
                Ok(vector)
            }
            Err(RetryError::Aborted(err)) => {
                metrics::counter!("faff_embedding_requests_total", "outcome" => "failed")
                    .increment(1);
                Err(err)
            }
            Err(RetryError::Exhausted { attempts, last }) => {
                warn!(attempts, error = %last, "embedding retries exhausted");
                metrics::counter!("faff_embedding_requests_total", "outcome" => "unavailable")
                    .increment(1);
                Err(EmbedError::Unavailable { attempts })
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
