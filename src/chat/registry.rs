//! Presence registry
//!
//! Live mapping of user ids to their active connection. Registration is
//! last-connection-wins so a reconnect (same user, new device or tab)
//! displaces the stale entry without manual cleanup; unregistration is
//! guarded by connection id so a stale connection's disconnect cannot
//! evict a newer registration.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use super::protocol::ServerMessage;

/// One registered connection
struct ConnectionEntry {
    connection_id: Uuid,
    sender: mpsc::UnboundedSender<ServerMessage>,
}

/// Thread-safe registry of online users
pub struct PresenceRegistry {
    connections: DashMap<String, ConnectionEntry>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a connection for a user
    ///
    /// Last connection wins: an existing entry for the user is replaced.
    /// Returns true when a prior connection was displaced.
    pub fn register(
        &self,
        user_id: &str,
        connection_id: Uuid,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) -> bool {
        let entry = ConnectionEntry {
            connection_id,
            sender,
        };
        let displaced = self
            .connections
            .insert(user_id.to_string(), entry)
            .is_some();

        debug!(
            user = %user_id,
            connection = %connection_id,
            displaced,
            "presence: registered"
        );
        displaced
    }

    /// Remove a user's registration, but only if `connection_id` is still
    /// the registered one
    ///
    /// A disconnect from a superseded connection is a no-op; returns true
    /// when the entry was actually removed.
    pub fn unregister_if_current(&self, user_id: &str, connection_id: Uuid) -> bool {
        let removed = self
            .connections
            .remove_if(user_id, |_, entry| entry.connection_id == connection_id)
            .is_some();

        debug!(
            user = %user_id,
            connection = %connection_id,
            removed,
            "presence: unregister"
        );
        removed
    }

    /// Whether a user currently has a registered connection
    pub fn is_online(&self, user_id: &str) -> bool {
        self.connections.contains_key(user_id)
    }

    /// Deliver a message to one user's connection
    ///
    /// Returns false when the user is offline or their channel is closed;
    /// a send racing a disconnect is silently discarded.
    pub fn send_to(&self, user_id: &str, message: ServerMessage) -> bool {
        match self.connections.get(user_id) {
            Some(entry) => entry.sender.send(message).is_ok(),
            None => false,
        }
    }

    /// Deliver a message to every registered connection
    pub fn broadcast(&self, message: ServerMessage) {
        for entry in self.connections.iter() {
            let _ = entry.sender.send(message.clone());
        }
    }

    /// Currently-online user ids
    pub fn online_users(&self) -> Vec<String> {
        self.connections.iter().map(|e| e.key().clone()).collect()
    }

    /// Number of registered connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
