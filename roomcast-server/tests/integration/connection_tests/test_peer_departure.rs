use roomcast_core::{ClientFrame, ServerFrame};
use std::time::Duration;

use crate::integration::{init_tracing, start_test_relay};
use crate::utils::TestClient;

#[tokio::test]
async fn test_socket_close_is_announced() {
    init_tracing();

    let (addr, relay) = start_test_relay(5).await;
    let mut watcher = TestClient::connect(addr).await.unwrap();
    let leaver = TestClient::connect(addr).await.unwrap();
    let leaver_id = leaver.peer_id;

    leaver.close().await.unwrap();

    watcher
        .wait_for_frame(&ServerFrame::PeerLeft(leaver_id))
        .await
        .expect("Departure should be broadcast");
    assert!(!relay.is_connected(&leaver_id));
}

#[tokio::test]
async fn test_dc_verb_ends_session_once() {
    init_tracing();

    let (addr, relay) = start_test_relay(5).await;
    let mut watcher = TestClient::connect(addr).await.unwrap();
    let mut leaver = TestClient::connect(addr).await.unwrap();
    let leaver_id = leaver.peer_id;

    leaver.send(&ClientFrame::Disconnect).await.unwrap();

    watcher
        .wait_for_frame(&ServerFrame::PeerLeft(leaver_id))
        .await
        .unwrap();
    // The relay closes the socket after DC.
    assert!(leaver.next_line(1000).await.is_none());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(relay.peer_count(), 1);
    watcher.expect_silence(200).await.unwrap();
}

#[tokio::test]
async fn test_owner_departure_reassigns_room() {
    init_tracing();

    let (addr, relay) = start_test_relay(5).await;
    let mut owner = TestClient::connect(addr).await.unwrap();
    let mut heir = TestClient::connect(addr).await.unwrap();

    owner.send_line("ADD_ROOM Arena 4").await.unwrap();
    let room_id = match heir
        .wait_for(|f| matches!(f, ServerFrame::RoomAdded(_)))
        .await
        .unwrap()
    {
        ServerFrame::RoomAdded(info) => info.id,
        _ => unreachable!(),
    };

    owner.send(&ClientFrame::JoinRoom { room_id }).await.unwrap();
    heir.wait_for_frame(&ServerFrame::RoomOwner {
        room_id,
        owner: Some(owner.peer_id),
    })
    .await
    .unwrap();

    heir.send(&ClientFrame::JoinRoom { room_id }).await.unwrap();
    heir.wait_for_frame(&ServerFrame::JoinedRoom {
        peer_id: heir.peer_id,
        room_id,
    })
    .await
    .unwrap();

    let owner_id = owner.peer_id;
    owner.close().await.unwrap();

    heir.wait_for_frame(&ServerFrame::LeftRoom {
        peer_id: owner_id,
        room_id,
    })
    .await
    .unwrap();
    heir.wait_for_frame(&ServerFrame::RoomOwner {
        room_id,
        owner: Some(heir.peer_id),
    })
    .await
    .unwrap();
    heir.wait_for_frame(&ServerFrame::PeerLeft(owner_id))
        .await
        .unwrap();

    let info = relay.describe_room(room_id).await.unwrap();
    assert_eq!(info.owner, Some(heir.peer_id));
    assert_eq!(info.members.len(), 1);
}
