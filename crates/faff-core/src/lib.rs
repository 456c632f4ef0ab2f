// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Faff messaging service.
//!
//! This crate provides the trait definitions, error types, common types and
//! the vector literal codec used throughout the Faff workspace.

pub mod error;
pub mod traits;
pub mod types;
pub mod vector;

// Re-export key items at crate root for ergonomic imports.
pub use error::{EmbedError, FaffError};
pub use types::{
    AdapterType, ConversationMessage, HealthStatus, Message, MessageId, NewMessage, NewUser,
    ScoredMessage, SimilarityHit, StoredUser, User, UserId,
};

pub use traits::{EmbeddingAdapter, MessageStore, PluginAdapter, TokenVerifier, UserStore};
