// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory collaborators for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use faff_core::{
    AdapterType, ConversationMessage, EmbedError, EmbeddingAdapter, FaffError, HealthStatus,
    Message, MessageId, MessageStore, NewMessage, PluginAdapter, SimilarityHit, UserId,
};

#[derive(Default)]
pub(crate) struct FakeStore {
    pub rows: Mutex<Vec<Message>>,
    /// Ids whose vector gets filled by "someone else" right before an update.
    pub raced: Mutex<HashSet<i64>>,
    pub hits: Mutex<Vec<SimilarityHit>>,
}

impl FakeStore {
    pub fn with_pending(bodies: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut rows = store.rows.lock().unwrap();
            for (i, body) in bodies.iter().enumerate() {
                rows.push(message(i as i64 + 1, 1, 2, body));
            }
        }
        store
    }

    pub fn vectors(&self) -> Vec<Option<Vec<f32>>> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.embedding.clone())
            .collect()
    }
}

pub(crate) fn message(id: i64, sender: i64, receiver: i64, body: &str) -> Message {
    Message {
        id: MessageId(id),
        sender_id: UserId(sender),
        receiver_id: UserId(receiver),
        message: body.to_string(),
        created_at: format!("2026-01-01T00:00:{id:02}.000Z"),
        updated_at: None,
        embedding: None,
    }
}

#[async_trait]
impl MessageStore for FakeStore {
    async fn insert(&self, new: NewMessage) -> Result<Message, FaffError> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        let mut stored = message(id, new.sender_id.0, new.receiver_id.0, &new.body);
        stored.embedding = new.embedding;
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn select_conversation(
        &self,
        a: UserId,
        b: UserId,
        limit: usize,
    ) -> Result<Vec<ConversationMessage>, FaffError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.involves(a) && m.involves(b))
            .take(limit)
            .map(|m| ConversationMessage {
                message: m.clone(),
                sender_name: format!("user{}", m.sender_id),
            })
            .collect())
    }

    async fn select_by_similarity(
        &self,
        _user: UserId,
        _vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SimilarityHit>, FaffError> {
        Ok(self.hits.lock().unwrap().iter().take(limit).cloned().collect())
    }

    async fn count_missing_vectors(&self) -> Result<u64, FaffError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.embedding.is_none())
            .count() as u64)
    }

    async fn select_missing_vector_batch(&self, limit: usize) -> Result<Vec<Message>, FaffError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.embedding.is_none())
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_vector(&self, id: MessageId, vector: &[f32]) -> Result<bool, FaffError> {
        let raced = self.raced.lock().unwrap().remove(&id.0);
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|m| m.id == id) else {
            return Ok(false);
        };
        if raced {
            row.embedding = Some(vec![9.0; vector.len()]);
        }
        if row.embedding.is_some() {
            return Ok(false);
        }
        row.embedding = Some(vector.to_vec());
        Ok(true)
    }
}

/// Returns a two-component vector derived from the text length, or fails for
/// texts containing `fail_on`.
pub(crate) struct FakeEmbedder {
    pub fail_on: Option<&'static str>,
    pub calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn ok() -> Self {
        Self {
            fail_on: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(needle: &'static str) -> Self {
        Self {
            fail_on: Some(needle),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for FakeEmbedder {
    fn name(&self) -> &str {
        "fake-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 0, 0)
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
impl EmbeddingAdapter for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.is_some_and(|needle| text.contains(needle)) {
            return Err(EmbedError::Unavailable { attempts: 3 });
        }
        Ok(vec![text.len() as f32, 1.0])
    }

    fn dimensions(&self) -> usize {
        2
    }
}
