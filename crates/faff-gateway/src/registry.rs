// SPDX-FileCopyrightText: 2026 Faff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Presence registry: which live connection currently speaks for which user.
//!
//! Two maps are kept. `bound` maps an authenticated identity to its current
//! connection (at most one per user). `live` holds every open connection,
//! authenticated or not, and is the broadcast set.

use dashmap::DashMap;
use faff_core::UserId;
use faff_messaging::recording;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::events::ServerEvent;

/// Outbound queue depth per connection.
pub const CONNECTION_QUEUE: usize = 64;

/// Opaque identifier of one transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub uuid::Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Sending half of a connection's outbound event queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    pub fn new(tx: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: ConnectionId::new(),
            tx,
        }
    }

    /// A handle and the receiver its writer task drains.
    pub fn channel() -> (Self, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(CONNECTION_QUEUE);
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue an event without waiting. Returns `false` if it was dropped.
    pub fn deliver(&self, event: ServerEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(connection = %self.id, event = event.name(), "outbound queue full, dropping event");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Concurrent map from identities and connection ids to live connections.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    bound: DashMap<UserId, ConnectionHandle>,
    live: DashMap<ConnectionId, ConnectionHandle>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly opened connection to the broadcast set.
    pub fn register(&self, handle: ConnectionHandle) {
        self.live.insert(handle.id(), handle);
        recording::set_active_connections(self.live.len());
    }

    /// Remove a closed connection from the broadcast set.
    pub fn deregister(&self, id: ConnectionId) {
        self.live.remove(&id);
        recording::set_active_connections(self.live.len());
    }

    /// Bind `user` to `handle`, replacing and returning any previous binding.
    pub fn bind(&self, user: UserId, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let previous = self.bound.insert(user, handle);
        if let Some(prev) = &previous {
            debug!(user = %user, previous = %prev.id(), "replaced existing binding");
        }
        previous
    }

    /// Remove any binding for `user`.
    pub fn unbind(&self, user: UserId) -> Option<ConnectionHandle> {
        self.bound.remove(&user).map(|(_, handle)| handle)
    }

    /// Remove the binding for `user` only if it still points at `id`.
    pub fn unbind_if(&self, user: UserId, id: ConnectionId) -> bool {
        self.bound
            .remove_if(&user, |_, handle| handle.id() == id)
            .is_some()
    }

    pub fn lookup(&self, user: UserId) -> Option<ConnectionHandle> {
        self.bound.get(&user).map(|entry| entry.value().clone())
    }

    pub fn is_online(&self, user: UserId) -> bool {
        self.bound.contains_key(&user)
    }

    /// Deliver `event` to the connection bound to `user`. Offline is a no-op.
    pub fn send_to_user(&self, user: UserId, event: ServerEvent) -> bool {
        match self.lookup(user) {
            Some(handle) => handle.deliver(event),
            None => false,
        }
    }

    /// Deliver `event` to every live connection except `except`.
    /// Returns the number of connections the event was queued on.
    pub fn broadcast_except(&self, except: ConnectionId, event: &ServerEvent) -> usize {
        let targets: Vec<ConnectionHandle> = self
            .live
            .iter()
            .filter(|entry| *entry.key() != except)
            .map(|entry| entry.value().clone())
            .collect();

        targets
            .into_iter()
            .filter(|handle| handle.deliver(event.clone()))
            .count()
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.live.len()
    }
}
