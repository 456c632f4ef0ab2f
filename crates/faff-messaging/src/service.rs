// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send path: validate, enrich with a vector when possible, persist.

use std::sync::Arc;

use faff_core::{
    ConversationMessage, EmbeddingAdapter, FaffError, Message, MessageStore, NewMessage, UserId,
};
use tracing::{info, warn};

use crate::recording;

/// Default page size for conversation listings.
pub const DEFAULT_CONVERSATION_LIMIT: usize = 50;

/// Persists direct messages, attaching an embedding when the provider answers.
///
/// Persistence never waits on a healthy provider: any embedding failure
/// degrades to a message without a vector, which the backfill job picks up later.
#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
    embedder: Arc<dyn EmbeddingAdapter>,
}

impl MessageService {
    pub fn new(store: Arc<dyn MessageStore>, embedder: Arc<dyn EmbeddingAdapter>) -> Self {
        Self { store, embedder }
    }

    /// Store a message from `sender` to `receiver`.
    ///
    /// The body is trimmed; an empty body or unknown participant is `InputInvalid`.
    pub async fn send(
        &self,
        sender: UserId,
        receiver: UserId,
        body: &str,
    ) -> Result<Message, FaffError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(FaffError::InputInvalid("message must not be empty".into()));
        }

        let embedding = match self.embedder.embed(body).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                warn!(
                    sender = %sender,
                    receiver = %receiver,
                    error = %e,
                    "embedding failed, storing message without vector"
                );
                recording::record_embedding_failure("send");
                None
            }
        };
        let with_embedding = embedding.is_some();

        let message = self
            .store
            .insert(NewMessage {
                sender_id: sender,
                receiver_id: receiver,
                body: body.to_string(),
                embedding,
            })
            .await?;

        recording::record_message_sent(with_embedding);
        info!(
            message_id = message.id.0,
            sender = %sender,
            receiver = %receiver,
            with_embedding,
            "message stored"
        );
        Ok(message)
    }

    /// The conversation between `user` and `other`, oldest first.
    pub async fn conversation(
        &self,
        user: UserId,
        other: UserId,
        limit: Option<usize>,
    ) -> Result<Vec<ConversationMessage>, FaffError> {
        let limit = limit.unwrap_or(DEFAULT_CONVERSATION_LIMIT);
        if limit == 0 {
            return Err(FaffError::InputInvalid("limit must be greater than 0".into()));
        }
        self.store.select_conversation(user, other, limit).await
    }
}
