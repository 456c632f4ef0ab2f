// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the Faff services and their collaborators.
//!
//! Async traits use `#[async_trait]` so they stay object safe behind `Arc<dyn _>`.

pub mod adapter;
pub mod auth;
pub mod embedding;
pub mod storage;

pub use adapter::PluginAdapter;
pub use auth::TokenVerifier;
pub use embedding::EmbeddingAdapter;
pub use storage::{MessageStore, UserStore};
