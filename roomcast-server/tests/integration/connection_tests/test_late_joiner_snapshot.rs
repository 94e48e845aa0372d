use roomcast_core::{ClientFrame, ServerFrame};

use crate::integration::{init_tracing, start_test_relay};
use crate::utils::TestClient;

#[tokio::test]
async fn test_late_joiner_sees_rooms_and_members() {
    init_tracing();

    let (addr, _relay) = start_test_relay(5).await;
    let mut host = TestClient::connect(addr).await.unwrap();

    host.send_line("ADD_ROOM Red Team 3").await.unwrap();
    let room_id = match host
        .wait_for(|f| matches!(f, ServerFrame::RoomAdded(_)))
        .await
        .unwrap()
    {
        ServerFrame::RoomAdded(info) => {
            assert_eq!(info.name, "Red_Team");
            info.id
        }
        _ => unreachable!(),
    };

    host.send(&ClientFrame::JoinRoom { room_id }).await.unwrap();
    host.send(&ClientFrame::CloseRoom { room_id }).await.unwrap();
    host.wait_for_frame(&ServerFrame::RoomClosed(room_id))
        .await
        .unwrap();

    let late = TestClient::connect(addr).await.unwrap();
    assert_eq!(late.snapshot.rooms.len(), 1);

    let room = &late.snapshot.rooms[0];
    assert_eq!(room.id, room_id);
    assert_eq!(room.name, "Red_Team");
    assert_eq!(room.capacity, 3);
    assert_eq!(room.owner, Some(host.peer_id));
    assert!(room.closed);
    assert!(room.members.contains(&host.peer_id));
    assert_eq!(late.snapshot.peers.len(), 2);
}
