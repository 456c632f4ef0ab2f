// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging services for Faff.
//!
//! - [`MessageService`] persists messages with best-effort vector enrichment.
//! - [`SearchService`] ranks a user's messages by similarity to a phrase.
//! - [`BackfillJob`] fills in vectors that enrichment missed.
//!
//! All three talk to their collaborators only through the `faff-core` traits.

pub mod backfill;
#[cfg(test)]
mod fakes;
pub mod recording;
pub mod search;
pub mod service;

pub use backfill::{BackfillJob, BackfillReport};
pub use search::SearchService;
pub use service::{DEFAULT_CONVERSATION_LIMIT, MessageService};
