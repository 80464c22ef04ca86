//! Chat wire protocol
//!
//! JSON messages over the WebSocket, tagged by `type`.
//!
//! Client → server:
//! - `private_message` - send a message to another user
//! - `typing` / `stop_typing` - typing indicator signals
//! - `ping` - keep-alive
//!
//! Server → client:
//! - `online_users` - full online-user-id list (sent on every change)
//! - `user_offline` - explicit offline event for one user
//! - `private_message` - delivered message (echo to sender and copy to
//!   recipient)
//! - `typing` / `stop_typing` - forwarded indicator, scoped to the target
//! - `error` - synchronous rejection of the sender's last request
//! - `pong` - keep-alive reply

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A private message in transit
///
/// Not persisted by the gateway; durable chat history is an external
/// collaborator's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateMessage {
    pub id: Uuid,
    pub from: String,
    pub to: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Message received from a chat client
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Send a private message
    PrivateMessage { to: String, content: String },
    /// Signal typing toward a target user
    Typing { to: String },
    /// Explicitly stop the typing indicator
    StopTyping { to: String },
    /// Keep-alive ping
    Ping,
}

/// Message sent to a chat client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full list of currently-online user ids
    OnlineUsers { users: Vec<String> },
    /// A user went offline
    UserOffline { user_id: String },
    /// A delivered private message
    PrivateMessage { message: PrivateMessage },
    /// Someone is typing to this client
    Typing { from: String },
    /// Someone stopped typing to this client
    StopTyping { from: String },
    /// Synchronous rejection of the client's request
    Error { message: String },
    /// Keep-alive reply
    Pong,
}

/// Synchronous rejection reasons for chat operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The sender has no registered connection
    #[error("sender is not connected")]
    NotConnected,

    /// The recipient field was empty
    #[error("recipient must not be empty")]
    MissingRecipient,

    /// The content field was empty
    #[error("message content must not be empty")]
    MissingContent,
}
