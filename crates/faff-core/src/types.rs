// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the stores, services and the gateway.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Store-assigned identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned, strictly increasing message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Embedding,
    Auth,
}

/// Public view of a user account. The credential hash never leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

/// A user together with its stored credential hash, used only for login.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

/// Input for account registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A persisted direct message.
///
/// `embedding` is the only mutable attribute: it is written at most once,
/// either by the send path or by the backfill job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub message: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
}

impl Message {
    /// True when `user` is the sender or the receiver.
    pub fn involves(&self, user: UserId) -> bool {
        self.sender_id == user || self.receiver_id == user
    }
}

/// Input for a message insert.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub body: String,
    pub embedding: Option<Vec<f32>>,
}

/// A message row in a two-party conversation listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    #[serde(flatten)]
    pub message: Message,
    pub sender_name: String,
}

/// A raw similarity hit as returned by the message store.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityHit {
    pub message: Message,
    pub sender_name: String,
    pub receiver_name: String,
    /// Cosine distance between the query vector and the stored vector.
    pub distance: f32,
}

/// A search result ranked by similarity to a query phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMessage {
    #[serde(flatten)]
    pub message: Message,
    pub sender_name: String,
    pub receiver_name: String,
    /// `1 - distance`, clamped to `[0, 1]`.
    pub similarity_score: f32,
}

impl From<SimilarityHit> for ScoredMessage {
    fn from(hit: SimilarityHit) -> Self {
        let score = 1.0 - hit.distance;
        let similarity_score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        ScoredMessage {
            message: hit.message,
            sender_name: hit.sender_name,
            receiver_name: hit.receiver_name,
            similarity_score,
        }
    }
}
