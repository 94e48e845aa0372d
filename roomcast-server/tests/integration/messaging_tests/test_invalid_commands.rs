use roomcast_core::{RoomId, ServerFrame};

use crate::integration::{init_tracing, start_test_relay};
use crate::utils::TestClient;

#[tokio::test]
async fn test_malformed_frames_are_reported_and_session_survives() {
    init_tracing();

    let (addr, relay) = start_test_relay(5).await;
    let mut alice = TestClient::connect(addr).await.unwrap();
    let mut bob = TestClient::connect(addr).await.unwrap();
    alice
        .wait_for_frame(&ServerFrame::PeerJoined(bob.peer_id))
        .await
        .unwrap();

    let cases = [
        ("JOIN_ROOM not-an-id", "JOIN_ROOM"),
        ("ADD_ROOM Arena many", "ADD_ROOM"),
        ("ROOM_CLOSED whatever", "ROOM_CLOSED"),
        ("TO_ROOM 5e0b0c52-4a8e-4b5c-9d1f-1f7a2f7c1a10 JOINED", "JOINED"),
    ];

    for (line, word) in cases {
        bob.send_line(line).await.unwrap();
        assert_eq!(
            bob.next_frame().await.unwrap(),
            ServerFrame::InvalidCommand {
                word: word.into(),
                original: line.into()
            }
        );
    }

    alice.expect_silence(200).await.unwrap();
    assert!(relay.is_connected(&bob.peer_id));

    // Unknown room operations are ignored silently.
    let unknown = RoomId::new();
    bob.send_line(&format!("CLOSE_ROOM {unknown}")).await.unwrap();
    bob.send_line(&format!("REMOVE_ROOM {unknown}")).await.unwrap();
    bob.expect_silence(200).await.unwrap();

    bob.send_line(&format!("JOIN_ROOM {unknown}")).await.unwrap();
    assert_eq!(
        bob.next_frame().await.unwrap(),
        ServerFrame::JoinRoomFailed {
            reason: roomcast_core::JoinFailure::NoSuchRoom,
            room_id: unknown
        }
    );
}

#[tokio::test]
async fn test_non_utf8_line_is_reported_and_session_survives() {
    init_tracing();

    let (addr, relay) = start_test_relay(5).await;
    let mut alice = TestClient::connect(addr).await.unwrap();
    let mut bob = TestClient::connect(addr).await.unwrap();
    alice
        .wait_for_frame(&ServerFrame::PeerJoined(bob.peer_id))
        .await
        .unwrap();

    bob.send_raw(b"chat \xff\xfe hello\n").await.unwrap();
    assert_eq!(
        bob.next_frame().await.unwrap(),
        ServerFrame::InvalidCommand {
            word: "chat".into(),
            original: "chat \u{FFFD}\u{FFFD} hello".into()
        }
    );
    alice.expect_silence(200).await.unwrap();
    assert!(relay.is_connected(&bob.peer_id));

    // The stream stays usable afterwards.
    bob.send_line("chat still here").await.unwrap();
    let frame = alice.next_frame().await.unwrap();
    assert_eq!(
        frame,
        ServerFrame::Relayed {
            from: bob.peer_id,
            payload: "chat still here".into()
        }
    );
}
