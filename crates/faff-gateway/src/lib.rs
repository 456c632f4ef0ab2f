// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API and realtime WebSocket gateway for Faff.
//!
//! The REST surface covers accounts, messages and semantic search. The
//! `/ws` endpoint runs one [`session::Session`] per connection against a
//! shared [`PresenceRegistry`], which is also how `POST /api/messages`
//! delivers `new_message` to an online receiver.

pub mod auth;
pub mod error;
pub mod events;
pub mod handlers;
pub mod registry;
pub mod server;
pub mod session;
pub mod ws;

pub use auth::{AuthUser, JwtAuthority};
pub use error::ApiError;
pub use events::{ClientEvent, ServerEvent};
pub use registry::{ConnectionHandle, ConnectionId, PresenceRegistry};
pub use server::{AppState, build_router, serve};
pub use session::{Session, SessionContext, SessionState};
