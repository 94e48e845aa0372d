use roomcast_client::ClientEvent;
use std::collections::BTreeSet;

use crate::integration::{connect_recording, init_tracing, start_test_relay};
use crate::utils::wait_for;

#[tokio::test]
async fn test_late_joiner_mirrors_existing_room() {
    init_tracing();

    let addr = start_test_relay().await;
    let (a, mut a_rx) = connect_recording(addr).await;
    let (b, mut b_rx) = connect_recording(addr).await;

    a.sender().add_room("R", 4).unwrap();
    let room_id = match wait_for(&mut b_rx, |e| matches!(e, ClientEvent::RoomAdded { .. }))
        .await
        .unwrap()
    {
        ClientEvent::RoomAdded { room } => room.id,
        _ => unreachable!(),
    };

    a.sender().join_room(room_id).unwrap();
    wait_for(&mut b_rx, |e| {
        *e == ClientEvent::RoomOwner {
            room_id,
            owner: Some(a.peer_id()),
        }
    })
    .await
    .unwrap();
    b.sender().join_room(room_id).unwrap();
    wait_for(&mut a_rx, |e| {
        *e == ClientEvent::JoinedRoom {
            peer_id: b.peer_id(),
            room_id,
        }
    })
    .await
    .unwrap();

    let (c, _c_rx) = connect_recording(addr).await;
    let mirror = c.mirror().await;
    let room = mirror.room(&room_id).expect("Room should be mirrored");

    assert_eq!(room.capacity, 4);
    assert_eq!(room.members, BTreeSet::from([a.peer_id(), b.peer_id()]));
    assert_eq!(room.owner, Some(a.peer_id()));
    assert!(!room.closed);
    assert_eq!(mirror.room_of(&b.peer_id()), Some(room_id));
}
