use roomcast_core::{ClientFrame, JoinFailure, RoomInfo, ServerFrame};

use crate::integration::{init_tracing, start_test_relay};
use crate::utils::TestClient;

/// Two players fill a room, a third is turned away, the owner leaves and
/// the room ends up reopened and empty.
#[tokio::test]
async fn test_arena_scenario() {
    init_tracing();

    let (addr, relay) = start_test_relay(5).await;
    let mut a = TestClient::connect(addr).await.unwrap();
    let mut b = TestClient::connect(addr).await.unwrap();
    let mut c = TestClient::connect(addr).await.unwrap();

    a.send_line("ADD_ROOM Arena 2").await.unwrap();
    let room_id = match c
        .wait_for(|f| matches!(f, ServerFrame::RoomAdded(_)))
        .await
        .unwrap()
    {
        ServerFrame::RoomAdded(RoomInfo {
            id,
            name,
            capacity,
            owner,
            closed,
            ..
        }) => {
            assert_eq!(name, "Arena");
            assert_eq!(capacity, 2);
            assert_eq!(owner, None);
            assert!(!closed);
            id
        }
        _ => unreachable!(),
    };

    a.send(&ClientFrame::JoinRoom { room_id }).await.unwrap();
    c.wait_for_frame(&ServerFrame::RoomOwner {
        room_id,
        owner: Some(a.peer_id),
    })
    .await
    .unwrap();

    b.send(&ClientFrame::JoinRoom { room_id }).await.unwrap();
    c.wait_for_frame(&ServerFrame::JoinedRoom {
        peer_id: b.peer_id,
        room_id,
    })
    .await
    .unwrap();

    c.send(&ClientFrame::JoinRoom { room_id }).await.unwrap();
    assert_eq!(
        c.next_frame().await.unwrap(),
        ServerFrame::JoinRoomFailed {
            reason: JoinFailure::Full,
            room_id
        }
    );

    a.send(&ClientFrame::CloseRoom { room_id }).await.unwrap();
    c.wait_for_frame(&ServerFrame::RoomClosed(room_id))
        .await
        .unwrap();

    c.send(&ClientFrame::JoinRoom { room_id }).await.unwrap();
    assert_eq!(
        c.next_frame().await.unwrap(),
        ServerFrame::JoinRoomFailed {
            reason: JoinFailure::Closed,
            room_id
        }
    );

    a.send(&ClientFrame::LeaveRoom { room_id }).await.unwrap();
    assert_eq!(
        c.next_frame().await.unwrap(),
        ServerFrame::LeftRoom {
            peer_id: a.peer_id,
            room_id
        }
    );
    assert_eq!(
        c.next_frame().await.unwrap(),
        ServerFrame::RoomOwner {
            room_id,
            owner: Some(b.peer_id)
        }
    );

    b.send(&ClientFrame::LeaveRoom { room_id }).await.unwrap();
    assert_eq!(
        c.next_frame().await.unwrap(),
        ServerFrame::LeftRoom {
            peer_id: b.peer_id,
            room_id
        }
    );
    assert_eq!(
        c.next_frame().await.unwrap(),
        ServerFrame::RoomOwner {
            room_id,
            owner: None
        }
    );
    assert_eq!(
        c.next_frame().await.unwrap(),
        ServerFrame::RoomOpened(room_id)
    );

    let info = relay.describe_room(room_id).await.unwrap();
    assert!(info.members.is_empty());
    assert!(!info.closed);
    assert_eq!(info.owner, None);

    c.send(&ClientFrame::RemoveRoom { room_id }).await.unwrap();
    a.wait_for_frame(&ServerFrame::RoomRemoved(room_id))
        .await
        .unwrap();
    assert_eq!(relay.room_count(), 0);
}
