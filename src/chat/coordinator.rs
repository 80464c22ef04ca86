//! Presence and messaging coordinator
//!
//! Owns the presence registry and typing timers, and implements the
//! per-connection lifecycle:
//!
//! Connecting → Authenticated → Online → Disconnected
//!
//! Authentication happens before this module is reached (the upgrade
//! handler verifies the token subject against the claimed user id); the
//! coordinator handles everything from registration onward. All operations
//! are synchronous against the shared registry; delivery to a peer is
//! fire-and-forget through that peer's outbound channel, and a delivery
//! racing a disconnect is discarded without affecting the sender's echo.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use super::protocol::{ChatError, PrivateMessage, ServerMessage};
use super::registry::PresenceRegistry;
use super::typing::TypingTimers;

/// Coordinator for presence, typing indicators, and private messages
pub struct ChatCoordinator {
    registry: Arc<PresenceRegistry>,
    typing: Arc<TypingTimers>,
}

impl ChatCoordinator {
    pub fn new(typing_expiry: Duration) -> Self {
        Self {
            registry: Arc::new(PresenceRegistry::new()),
            typing: Arc::new(TypingTimers::new(typing_expiry)),
        }
    }

    /// Register an authenticated connection and announce the new presence
    ///
    /// Last connection wins for a user reconnecting from another device;
    /// the full online list is broadcast to every connection afterwards.
    pub fn connect(
        &self,
        user_id: &str,
        connection_id: Uuid,
        sender: mpsc::UnboundedSender<ServerMessage>,
    ) {
        let displaced = self.registry.register(user_id, connection_id, sender);
        info!(user = %user_id, connection = %connection_id, displaced, "chat: online");
        self.broadcast_online_users();
    }

    /// Handle a connection loss
    ///
    /// Presence is only dropped when the disconnecting connection is still
    /// the registered one; a stale disconnect after a reconnect is a no-op.
    pub fn disconnect(&self, user_id: &str, connection_id: Uuid) {
        if self.registry.unregister_if_current(user_id, connection_id) {
            info!(user = %user_id, connection = %connection_id, "chat: offline");
            self.broadcast_online_users();
            self.registry.broadcast(ServerMessage::UserOffline {
                user_id: user_id.to_string(),
            });
        } else {
            debug!(
                user = %user_id,
                connection = %connection_id,
                "chat: stale disconnect ignored"
            );
        }
    }

    /// Send a private message
    ///
    /// The sender must be online and both fields non-empty. The message is
    /// echoed to the sender as delivery confirmation; if the recipient is
    /// online it is forwarded to them as well. Offline recipients are not
    /// queued - durable history is an external collaborator's concern.
    pub fn send_private(
        &self,
        from: &str,
        to: &str,
        content: &str,
    ) -> Result<PrivateMessage, ChatError> {
        if !self.registry.is_online(from) {
            return Err(ChatError::NotConnected);
        }
        if to.is_empty() {
            return Err(ChatError::MissingRecipient);
        }
        if content.is_empty() {
            return Err(ChatError::MissingContent);
        }

        let message = PrivateMessage {
            id: Uuid::new_v4(),
            from: from.to_string(),
            to: to.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        };

        // Echo to sender first; recipient delivery must not affect it
        self.registry.send_to(
            from,
            ServerMessage::PrivateMessage {
                message: message.clone(),
            },
        );

        if to != from && self.registry.is_online(to) {
            let delivered = self.registry.send_to(
                to,
                ServerMessage::PrivateMessage {
                    message: message.clone(),
                },
            );
            debug!(from = %from, to = %to, delivered, "chat: message forwarded");
        }

        Ok(message)
    }

    /// Forward a typing signal and arm its expiry timer
    ///
    /// Only online targets receive the indicator; the per-(sender, target)
    /// timer auto-emits stop-typing after the quiet period.
    pub fn signal_typing(&self, from: &str, to: &str) {
        if !self.registry.is_online(to) {
            return;
        }
        self.registry.send_to(
            to,
            ServerMessage::Typing {
                from: from.to_string(),
            },
        );
        self.typing
            .signal(Arc::clone(&self.registry), from, to);
    }

    /// Explicitly stop a typing indicator
    pub fn stop_typing(&self, from: &str, to: &str) {
        self.typing.cancel(from, to);
        if self.registry.is_online(to) {
            self.registry.send_to(
                to,
                ServerMessage::StopTyping {
                    from: from.to_string(),
                },
            );
        }
    }

    /// Currently-online user ids
    pub fn list_online(&self) -> Vec<String> {
        self.registry.online_users()
    }

    /// Number of live connections
    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    fn broadcast_online_users(&self) {
        self.registry.broadcast(ServerMessage::OnlineUsers {
            users: self.registry.online_users(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> ChatCoordinator {
        ChatCoordinator::new(Duration::from_millis(50))
    }

    fn join(
        coordinator: &ChatCoordinator,
        user: &str,
    ) -> (Uuid, mpsc::UnboundedReceiver<ServerMessage>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        coordinator.connect(user, id, tx);
        (id, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    #[tokio::test]
    async fn test_connect_broadcasts_online_list() {
        let chat = coordinator();
        let (_, mut alice_rx) = join(&chat, "alice");
        let (_, mut bob_rx) = join(&chat, "bob");

        // Bob's join reached both connections
        let alice_msgs = drain(&mut alice_rx);
        assert!(alice_msgs.iter().any(|m| matches!(
            m,
            ServerMessage::OnlineUsers { users } if users.len() == 2
        )));
        let bob_msgs = drain(&mut bob_rx);
        assert!(bob_msgs
            .iter()
            .any(|m| matches!(m, ServerMessage::OnlineUsers { .. })));
    }

    #[tokio::test]
    async fn test_send_private_echoes_and_delivers() {
        let chat = coordinator();
        let (_, mut alice_rx) = join(&chat, "alice");
        let (_, mut bob_rx) = join(&chat, "bob");
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        let sent = chat.send_private("alice", "bob", "hello").unwrap();
        assert_eq!(sent.from, "alice");
        assert_eq!(sent.to, "bob");

        // Sender echo
        let alice_msgs = drain(&mut alice_rx);
        assert!(alice_msgs.iter().any(|m| matches!(
            m,
            ServerMessage::PrivateMessage { message } if message.id == sent.id
        )));

        // Recipient delivery
        let bob_msgs = drain(&mut bob_rx);
        assert!(bob_msgs.iter().any(|m| matches!(
            m,
            ServerMessage::PrivateMessage { message } if message.id == sent.id
        )));
    }

    #[tokio::test]
    async fn test_send_to_offline_recipient_acks_without_delivery() {
        let chat = coordinator();
        let (_, mut alice_rx) = join(&chat, "alice");
        let (_, mut carol_rx) = join(&chat, "carol");
        drain(&mut alice_rx);
        drain(&mut carol_rx);

        // Bob is offline: the send still succeeds with the sender echo
        let sent = chat.send_private("alice", "bob", "anyone home?").unwrap();
        let alice_msgs = drain(&mut alice_rx);
        assert!(alice_msgs.iter().any(|m| matches!(
            m,
            ServerMessage::PrivateMessage { message } if message.id == sent.id
        )));

        // No other connection observes a delivery
        assert!(drain(&mut carol_rx)
            .iter()
            .all(|m| !matches!(m, ServerMessage::PrivateMessage { .. })));
    }

    #[tokio::test]
    async fn test_send_validation() {
        let chat = coordinator();
        let (_, _alice_rx) = join(&chat, "alice");

        assert_eq!(
            chat.send_private("ghost", "alice", "hi").unwrap_err(),
            ChatError::NotConnected
        );
        assert_eq!(
            chat.send_private("alice", "", "hi").unwrap_err(),
            ChatError::MissingRecipient
        );
        assert_eq!(
            chat.send_private("alice", "bob", "").unwrap_err(),
            ChatError::MissingContent
        );
    }

    #[tokio::test]
    async fn test_reconnect_supersedes_and_stale_disconnect_ignored() {
        let chat = coordinator();
        let (first, _rx1) = join(&chat, "alice");
        let (second, mut rx2) = join(&chat, "alice");
        drain(&mut rx2);

        // The stale connection disconnecting must not take alice offline
        chat.disconnect("alice", first);
        assert!(chat.list_online().contains(&"alice".to_string()));
        assert!(drain(&mut rx2)
            .iter()
            .all(|m| !matches!(m, ServerMessage::UserOffline { .. })));

        // The current connection disconnecting does
        chat.disconnect("alice", second);
        assert!(chat.list_online().is_empty());
    }

    #[tokio::test]
    async fn test_typing_forwarded_only_when_online() {
        let chat = coordinator();
        let (_, mut alice_rx) = join(&chat, "alice");
        let (_, mut bob_rx) = join(&chat, "bob");
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        chat.signal_typing("alice", "bob");
        assert!(matches!(
            drain(&mut bob_rx).as_slice(),
            [ServerMessage::Typing { from }] if from == "alice"
        ));

        // Offline target: nothing happens, no timer armed
        chat.signal_typing("alice", "carol");
        chat.stop_typing("alice", "bob");
        assert!(matches!(
            drain(&mut bob_rx).as_slice(),
            [ServerMessage::StopTyping { from }] if from == "alice"
        ));
    }

    #[tokio::test]
    async fn test_typing_auto_expires() {
        let chat = coordinator();
        let (_, mut alice_rx) = join(&chat, "alice");
        let (_, mut bob_rx) = join(&chat, "bob");
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        chat.signal_typing("alice", "bob");
        tokio::time::sleep(Duration::from_millis(120)).await;

        let msgs = drain(&mut bob_rx);
        assert!(msgs
            .iter()
            .any(|m| matches!(m, ServerMessage::Typing { .. })));
        assert!(msgs
            .iter()
            .any(|m| matches!(m, ServerMessage::StopTyping { .. })));
    }

    #[tokio::test]
    async fn test_self_message_echoes_once() {
        let chat = coordinator();
        let (_, mut alice_rx) = join(&chat, "alice");
        drain(&mut alice_rx);

        let sent = chat.send_private("alice", "alice", "note to self").unwrap();
        let echoes: Vec<_> = drain(&mut alice_rx)
            .into_iter()
            .filter(|m| matches!(
                m,
                ServerMessage::PrivateMessage { message } if message.id == sent.id
            ))
            .collect();
        assert_eq!(echoes.len(), 1);
    }
}
