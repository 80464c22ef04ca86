//! Chat coordinator integration tests
//!
//! Exercises the presence/messaging protocol semantics end to end through
//! the coordinator's public surface: reconnect races, offline delivery,
//! typing expiry, and the JWT identity check used at connect time.

use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use ecotrack::auth::JwtValidator;
use ecotrack::chat::{ChatCoordinator, ChatError, ServerMessage};

// =============================================================================
// Helpers
// =============================================================================

fn coordinator() -> ChatCoordinator {
    ChatCoordinator::new(Duration::from_millis(40))
}

fn join(
    chat: &ChatCoordinator,
    user: &str,
) -> (Uuid, mpsc::UnboundedReceiver<ServerMessage>) {
    let id = Uuid::new_v4();
    let (tx, rx) = mpsc::unbounded_channel();
    chat.connect(user, id, tx);
    (id, rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

// =============================================================================
// Presence lifecycle
// =============================================================================

#[tokio::test]
async fn test_online_list_tracks_connects_and_disconnects() {
    let chat = coordinator();
    let (alice_conn, mut alice_rx) = join(&chat, "alice");
    let (_bob_conn, mut bob_rx) = join(&chat, "bob");

    let mut online = chat.list_online();
    online.sort();
    assert_eq!(online, vec!["alice", "bob"]);

    chat.disconnect("alice", alice_conn);
    assert_eq!(chat.list_online(), vec!["bob"]);

    // Bob saw the updated list and the explicit offline event
    let msgs = drain(&mut bob_rx);
    assert!(msgs.iter().any(|m| matches!(
        m,
        ServerMessage::OnlineUsers { users } if users == &vec!["bob".to_string()]
    )));
    assert!(msgs.iter().any(|m| matches!(
        m,
        ServerMessage::UserOffline { user_id } if user_id == "alice"
    )));

    let _ = drain(&mut alice_rx);
}

#[tokio::test]
async fn test_second_connection_becomes_addressable() {
    let chat = coordinator();
    let (first_conn, mut first_rx) = join(&chat, "alice");
    let (second_conn, mut second_rx) = join(&chat, "alice");
    let (_bob_conn, _bob_rx) = join(&chat, "bob");
    drain(&mut first_rx);
    drain(&mut second_rx);

    // Delivery lands on the second (current) connection only
    chat.send_private("bob", "alice", "which device?").unwrap();
    assert!(drain(&mut second_rx)
        .iter()
        .any(|m| matches!(m, ServerMessage::PrivateMessage { .. })));
    assert!(drain(&mut first_rx)
        .iter()
        .all(|m| !matches!(m, ServerMessage::PrivateMessage { .. })));

    // The stale connection's disconnect must not remove alice
    chat.disconnect("alice", first_conn);
    assert!(chat.list_online().contains(&"alice".to_string()));

    chat.disconnect("alice", second_conn);
    assert!(!chat.list_online().contains(&"alice".to_string()));
}

// =============================================================================
// Message delivery
// =============================================================================

#[tokio::test]
async fn test_offline_recipient_gets_no_copy_but_sender_is_acked() {
    let chat = coordinator();
    let (_alice_conn, mut alice_rx) = join(&chat, "alice");
    let (_carol_conn, mut carol_rx) = join(&chat, "carol");
    drain(&mut alice_rx);
    drain(&mut carol_rx);

    let ack = chat.send_private("alice", "bob", "hello?").unwrap();
    assert_eq!(ack.to, "bob");
    assert!(!ack.id.is_nil());

    // Sender echo arrives; no other connection observes a delivery
    assert!(drain(&mut alice_rx).iter().any(|m| matches!(
        m,
        ServerMessage::PrivateMessage { message } if message.id == ack.id
    )));
    assert!(drain(&mut carol_rx)
        .iter()
        .all(|m| !matches!(m, ServerMessage::PrivateMessage { .. })));
}

#[tokio::test]
async fn test_rejections_are_synchronous_and_private() {
    let chat = coordinator();
    let (_alice_conn, mut alice_rx) = join(&chat, "alice");
    let (_bob_conn, mut bob_rx) = join(&chat, "bob");
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    assert_eq!(
        chat.send_private("alice", "bob", "").unwrap_err(),
        ChatError::MissingContent
    );
    assert_eq!(
        chat.send_private("intruder", "bob", "hi").unwrap_err(),
        ChatError::NotConnected
    );

    // Nothing was broadcast for either rejection
    assert!(drain(&mut bob_rx).is_empty());
}

// =============================================================================
// Typing indicators
// =============================================================================

#[tokio::test]
async fn test_typing_burst_then_quiet_expires_once() {
    let chat = coordinator();
    let (_alice_conn, mut alice_rx) = join(&chat, "alice");
    let (_bob_conn, mut bob_rx) = join(&chat, "bob");
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    // A burst of signals: each renewal cancels the previous timer
    for _ in 0..3 {
        chat.signal_typing("alice", "bob");
        tokio::time::sleep(Duration::from_millis(15)).await;
    }

    tokio::time::sleep(Duration::from_millis(80)).await;
    let msgs = drain(&mut bob_rx);
    let stops = msgs
        .iter()
        .filter(|m| matches!(m, ServerMessage::StopTyping { .. }))
        .count();
    assert_eq!(stops, 1);
}

#[tokio::test]
async fn test_explicit_stop_prevents_expiry() {
    let chat = coordinator();
    let (_alice_conn, mut alice_rx) = join(&chat, "alice");
    let (_bob_conn, mut bob_rx) = join(&chat, "bob");
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    chat.signal_typing("alice", "bob");
    chat.stop_typing("alice", "bob");
    let msgs = drain(&mut bob_rx);
    assert!(msgs.iter().any(|m| matches!(m, ServerMessage::Typing { .. })));
    assert!(msgs
        .iter()
        .any(|m| matches!(m, ServerMessage::StopTyping { .. })));

    // The aborted timer must not fire a second stop
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(drain(&mut bob_rx).is_empty());
}

// =============================================================================
// Connect-time identity check
// =============================================================================

#[test]
fn test_token_subject_must_match_claimed_identity() {
    let jwt = JwtValidator::new_dev();
    let token = jwt.issue_token("alice").unwrap();

    let result = jwt.verify_token(&token);
    assert!(result.valid);
    let subject = result.claims.unwrap().sub;

    // The gateway compares the claimed user id against the subject
    assert_eq!(subject, "alice");
    assert_ne!(subject, "mallory");
}
