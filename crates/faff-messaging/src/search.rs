// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic search over a user's own conversations.

use std::sync::Arc;

use faff_config::model::SearchConfig;
use faff_core::{EmbeddingAdapter, FaffError, MessageStore, ScoredMessage, UserId};
use tracing::{debug, warn};

use crate::recording;

/// Ranks a user's messages by cosine similarity to a query phrase.
#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn MessageStore>,
    embedder: Arc<dyn EmbeddingAdapter>,
    config: SearchConfig,
}

impl SearchService {
    pub fn new(
        store: Arc<dyn MessageStore>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: SearchConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Messages where `user` is sender or receiver, most similar first.
    ///
    /// `limit` defaults to `search.default_limit` and is capped at
    /// `search.max_limit`. A provider outage yields an empty list, not an error.
    pub async fn search(
        &self,
        user: UserId,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ScoredMessage>, FaffError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FaffError::InputInvalid("search query must not be empty".into()));
        }
        let limit = match limit {
            Some(0) => {
                return Err(FaffError::InputInvalid("limit must be greater than 0".into()));
            }
            Some(n) => n.min(self.config.max_limit),
            None => self.config.default_limit,
        };

        recording::record_search();

        let vector = match self.embedder.embed(query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(user = %user, error = %e, "query embedding failed, returning no results");
                recording::record_embedding_failure("search");
                return Ok(Vec::new());
            }
        };

        let hits = self.store.select_by_similarity(user, &vector, limit).await?;
        debug!(user = %user, limit, results = hits.len(), "semantic search complete");

        Ok(hits
            .into_iter()
            .filter(|hit| hit.message.involves(user))
            .map(ScoredMessage::from)
            .collect())
    }
}
