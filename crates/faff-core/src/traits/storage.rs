// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store traits for users and messages.

use async_trait::async_trait;

use crate::error::FaffError;
use crate::types::{
    ConversationMessage, Message, MessageId, NewMessage, NewUser, SimilarityHit, StoredUser, User,
    UserId,
};

/// Persistence and credential checks for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, FaffError>;

    /// Looks up a user and its credential hash by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, FaffError>;

    /// Creates an account, hashing the password. Duplicate emails are a `Conflict`.
    async fn create(&self, new_user: NewUser) -> Result<User, FaffError>;

    /// Lists all users ordered by name.
    async fn list(&self) -> Result<Vec<User>, FaffError>;

    /// Checks a plaintext password against a stored hash.
    fn verify_credential(&self, password: &str, password_hash: &str) -> bool;
}

/// Durable, append-only message persistence with a nullable vector column.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Inserts a message in one write and returns the stored record.
    async fn insert(&self, message: NewMessage) -> Result<Message, FaffError>;

    /// Both directions of the conversation between `a` and `b`, oldest first.
    async fn select_conversation(
        &self,
        a: UserId,
        b: UserId,
        limit: usize,
    ) -> Result<Vec<ConversationMessage>, FaffError>;

    /// Messages involving `user` with a vector of matching dimensionality,
    /// ordered by ascending cosine distance to `vector`.
    async fn select_by_similarity(
        &self,
        user: UserId,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SimilarityHit>, FaffError>;

    /// Number of messages without a vector.
    async fn count_missing_vectors(&self) -> Result<u64, FaffError>;

    /// Oldest-first batch of messages without a vector.
    async fn select_missing_vector_batch(&self, limit: usize) -> Result<Vec<Message>, FaffError>;

    /// Sets the vector of a message if it is still absent.
    ///
    /// Returns `false` when the message already had a vector or does not exist.
    async fn update_vector(&self, id: MessageId, vector: &[f32]) -> Result<bool, FaffError>;
}
