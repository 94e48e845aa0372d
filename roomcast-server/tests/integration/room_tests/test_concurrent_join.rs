use roomcast_core::{ClientFrame, JoinFailure, ServerFrame};

use crate::integration::{init_tracing, start_test_relay};
use crate::utils::TestClient;

#[tokio::test]
async fn test_last_seat_goes_to_exactly_one_peer() {
    init_tracing();

    let (addr, relay) = start_test_relay(5).await;
    let mut host = TestClient::connect(addr).await.unwrap();
    let mut b = TestClient::connect(addr).await.unwrap();
    let mut c = TestClient::connect(addr).await.unwrap();

    host.send_line("ADD_ROOM Duel 2").await.unwrap();
    let room_id = match host
        .wait_for(|f| matches!(f, ServerFrame::RoomAdded(_)))
        .await
        .unwrap()
    {
        ServerFrame::RoomAdded(info) => info.id,
        _ => unreachable!(),
    };
    host.send(&ClientFrame::JoinRoom { room_id }).await.unwrap();
    for client in [&mut b, &mut c] {
        client
            .wait_for_frame(&ServerFrame::JoinedRoom {
                peer_id: host.peer_id,
                room_id,
            })
            .await
            .unwrap();
    }

    let join = ClientFrame::JoinRoom { room_id };
    let (sent_b, sent_c) = futures::join!(b.send(&join), c.send(&join));
    sent_b.unwrap();
    sent_c.unwrap();

    let outcome = |frame: &ServerFrame| match frame {
        ServerFrame::JoinRoomFailed { room_id: r, .. } => *r == room_id,
        ServerFrame::JoinedRoom { room_id: r, .. } => *r == room_id,
        _ => false,
    };
    let first_b = b.wait_for(outcome).await.unwrap();
    let first_c = c.wait_for(outcome).await.unwrap();

    let full = |frame: &ServerFrame| {
        *frame
            == ServerFrame::JoinRoomFailed {
                reason: JoinFailure::Full,
                room_id,
            }
    };
    // Whoever lost sees the winner's JOINED_ROOM before its own refusal.
    let b_won = relay.room_of(&b.peer_id) == Some(room_id);
    let c_won = relay.room_of(&c.peer_id) == Some(room_id);
    assert!(b_won ^ c_won);

    let info = relay.describe_room(room_id).await.unwrap();
    assert_eq!(info.members.len(), 2);

    let (loser, winner_frame) = if b_won { (&mut c, first_b) } else { (&mut b, first_c) };
    assert!(matches!(winner_frame, ServerFrame::JoinedRoom { .. }));
    loser.wait_for(full).await.unwrap();
}
