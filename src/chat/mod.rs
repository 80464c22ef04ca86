//! Real-time private messaging
//!
//! Friend-to-friend chat with presence and typing indicators over a JSON
//! WebSocket protocol (see [`protocol`]). A connection moves through
//! Connecting → Authenticated → Online → Disconnected; the coordinator
//! guarantees last-connection-wins presence, at-least-once delivery to an
//! online recipient plus sender echo, and sender-driven typing expiry.
//! Nothing here is persisted: presence dies with the process and offline
//! recipients are not queued.

pub mod coordinator;
pub mod protocol;
pub mod registry;
pub mod typing;

pub use coordinator::ChatCoordinator;
pub use protocol::{ChatError, ClientMessage, PrivateMessage, ServerMessage};
pub use registry::PresenceRegistry;
pub use typing::TypingTimers;
