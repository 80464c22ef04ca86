//! Typing indicator expiry timers
//!
//! One cancellable task per (sender, target) pair. Every new signal
//! replaces and aborts the previous task, so the indicator only expires
//! after a full quiet period; an explicit stop cancels the pending task
//! outright. Expiry is sender-driven: the timer lives here, not on the
//! recipient's side.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use super::protocol::ServerMessage;
use super::registry::PresenceRegistry;

/// Timer table for pending typing expirations
pub struct TypingTimers {
    timers: DashMap<(String, String), JoinHandle<()>>,
    expiry: Duration,
}

impl TypingTimers {
    pub fn new(expiry: Duration) -> Self {
        Self {
            timers: DashMap::new(),
            expiry,
        }
    }

    /// Record a typing signal and (re)arm the expiry timer
    ///
    /// When the timer fires without a renewal, a stop-typing event is
    /// delivered to the target if they are still online.
    pub fn signal(self: &Arc<Self>, registry: Arc<PresenceRegistry>, from: &str, to: &str) {
        let key = (from.to_string(), to.to_string());
        let from = from.to_string();
        let to = to.to_string();

        let timers = Arc::clone(self);
        let expiry = self.expiry;
        let expiry_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(expiry).await;
            debug!(from = %from, to = %to, "typing indicator expired");
            registry.send_to(&to, ServerMessage::StopTyping { from });
            timers.timers.remove(&expiry_key);
        });

        if let Some(previous) = self.timers.insert(key, handle) {
            previous.abort();
        }
    }

    /// Cancel the pending expiry for a pair (explicit stop)
    pub fn cancel(&self, from: &str, to: &str) {
        if let Some((_, handle)) = self.timers.remove(&(from.to_string(), to.to_string())) {
            handle.abort();
        }
    }

    /// Number of pending expiry timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_expiry_sends_stop_typing() {
        let registry = Arc::new(PresenceRegistry::new());
        let timers = Arc::new(TypingTimers::new(Duration::from_millis(20)));

        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register("bob", Uuid::new_v4(), tx);

        timers.signal(Arc::clone(&registry), "alice", "bob");
        assert_eq!(timers.pending(), 1);

        tokio::time::sleep(Duration::from_millis(60)).await;
        match rx.try_recv() {
            Ok(ServerMessage::StopTyping { from }) => assert_eq!(from, "alice"),
            other => panic!("expected StopTyping, got {other:?}"),
        }
        assert_eq!(timers.pending(), 0);
    }

    #[tokio::test]
    async fn test_renewed_signal_replaces_timer() {
        let registry = Arc::new(PresenceRegistry::new());
        let timers = Arc::new(TypingTimers::new(Duration::from_millis(50)));

        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register("bob", Uuid::new_v4(), tx);

        timers.signal(Arc::clone(&registry), "alice", "bob");
        tokio::time::sleep(Duration::from_millis(30)).await;
        // Renewal before expiry: the old timer must not fire
        timers.signal(Arc::clone(&registry), "alice", "bob");
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(rx.try_recv().is_err());

        // The renewed timer eventually fires
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(matches!(
            rx.try_recv(),
            Ok(ServerMessage::StopTyping { .. })
        ));
    }

    #[tokio::test]
    async fn test_explicit_cancel() {
        let registry = Arc::new(PresenceRegistry::new());
        let timers = Arc::new(TypingTimers::new(Duration::from_millis(20)));

        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register("bob", Uuid::new_v4(), tx);

        timers.signal(Arc::clone(&registry), "alice", "bob");
        timers.cancel("alice", "bob");
        assert_eq!(timers.pending(), 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_pairs_are_independent() {
        let registry = Arc::new(PresenceRegistry::new());
        let timers = Arc::new(TypingTimers::new(Duration::from_millis(20)));

        timers.signal(Arc::clone(&registry), "alice", "bob");
        timers.signal(Arc::clone(&registry), "alice", "carol");
        assert_eq!(timers.pending(), 2);

        timers.cancel("alice", "bob");
        assert_eq!(timers.pending(), 1);
    }
}
