// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-connection realtime state machine.
//!
//! ```text
//! Unauthenticated --authenticate ok--> Authenticated --disconnect--> Closed
//!        |  ^                              |  ^
//!        +--+ auth_error                   +--+ typing relay / re-authenticate
//! ```
//!
//! The session knows nothing about the transport: it consumes decoded
//! [`ClientEvent`]s and emits [`ServerEvent`]s through its own
//! [`ConnectionHandle`] and the shared [`PresenceRegistry`].

use std::sync::Arc;

use faff_core::{TokenVerifier, UserId, UserStore};
use tracing::{debug, info, warn};

use crate::events::{ClientEvent, ServerEvent};
use crate::registry::{ConnectionHandle, ConnectionId, PresenceRegistry};

pub const MSG_TOKEN_MISSING: &str = "Authentication token not provided.";
pub const MSG_USER_NOT_FOUND: &str = "User not found.";
pub const MSG_INVALID_TOKEN: &str = "Authentication failed. Invalid token.";

/// Connection lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated { user_id: UserId, user_name: String },
    Closed,
}

/// Collaborators shared by every realtime session.
#[derive(Clone)]
pub struct SessionContext {
    pub registry: Arc<PresenceRegistry>,
    pub users: Arc<dyn UserStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

/// One connection's view of the realtime protocol.
pub struct Session {
    handle: ConnectionHandle,
    state: SessionState,
    ctx: SessionContext,
}

impl Session {
    /// Open a session and add its connection to the broadcast set.
    pub fn open(handle: ConnectionHandle, ctx: SessionContext) -> Self {
        ctx.registry.register(handle.clone());
        debug!(connection = %handle.id(), "realtime connection opened");
        Self {
            handle,
            state: SessionState::Unauthenticated,
            ctx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.handle.id()
    }

    /// Decode and handle one text frame. Undecodable frames are ignored.
    pub async fn handle_text(&mut self, text: &str) {
        match ClientEvent::parse(text) {
            Ok(event) => self.handle(event).await,
            Err(e) => warn!(connection = %self.handle.id(), "invalid realtime frame: {e}"),
        }
    }

    pub async fn handle(&mut self, event: ClientEvent) {
        if self.state == SessionState::Closed {
            return;
        }
        match event {
            ClientEvent::Authenticate(token) => self.authenticate(token).await,
            ClientEvent::Typing(target) => self.relay_typing(target, true),
            ClientEvent::StopTyping(target) => self.relay_typing(target, false),
            ClientEvent::Unknown(name) => {
                debug!(connection = %self.handle.id(), event = %name, "ignoring unknown event");
            }
        }
    }

    async fn authenticate(&mut self, token: Option<String>) {
        let Some(token) = token else {
            self.reply(ServerEvent::auth_error(MSG_TOKEN_MISSING));
            return;
        };

        let user = match self.ctx.verifier.verify(&token) {
            Ok(user_id) => self.ctx.users.find_by_id(user_id).await,
            Err(e) => Err(e),
        };
        let user = match user {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.reply(ServerEvent::auth_error(MSG_USER_NOT_FOUND));
                return;
            }
            Err(e) => {
                debug!(connection = %self.handle.id(), error = %e, "realtime authentication failed");
                self.reply(ServerEvent::auth_error(MSG_INVALID_TOKEN));
                return;
            }
        };

        if let SessionState::Authenticated { user_id, user_name } = &self.state
            && *user_id != user.id
        {
            self.release_identity(*user_id, user_name.clone());
        }

        self.ctx.registry.bind(user.id, self.handle.clone());
        self.state = SessionState::Authenticated {
            user_id: user.id,
            user_name: user.name.clone(),
        };
        info!(connection = %self.handle.id(), user = %user.id, "user connected");

        self.reply(ServerEvent::Authenticated {
            user_id: user.id,
            user_name: user.name.clone(),
        });
        self.ctx.registry.broadcast_except(
            self.handle.id(),
            &ServerEvent::UserOnline {
                user_id: user.id,
                user_name: user.name,
            },
        );
    }

    fn relay_typing(&self, target: Option<UserId>, started: bool) {
        let SessionState::Authenticated { user_id, .. } = &self.state else {
            return;
        };
        let Some(target) = target else {
            return;
        };
        let event = if started {
            ServerEvent::UserTyping {
                sender_id: *user_id,
            }
        } else {
            ServerEvent::UserStopTyping {
                sender_id: *user_id,
            }
        };
        self.ctx.registry.send_to_user(target, event);
    }

    /// Unbind `user` if this connection still holds it and announce them offline.
    fn release_identity(&self, user_id: UserId, user_name: String) {
        if self.ctx.registry.unbind_if(user_id, self.handle.id()) {
            info!(connection = %self.handle.id(), user = %user_id, "user disconnected");
            self.ctx.registry.broadcast_except(
                self.handle.id(),
                &ServerEvent::UserOffline { user_id, user_name },
            );
        }
    }

    /// Transport went away. Idempotent.
    pub fn close(&mut self) {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Closed => return,
            SessionState::Authenticated { user_id, user_name } => {
                self.release_identity(user_id, user_name);
            }
            SessionState::Unauthenticated => {}
        }
        self.ctx.registry.deregister(self.handle.id());
        debug!(connection = %self.handle.id(), "realtime connection closed");
    }

    fn reply(&self, event: ServerEvent) {
        self.handle.deliver(event);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
