use roomcast_client::{ClientEvent, ConnectionState, RelayClient};
use std::net::SocketAddr;

use crate::integration::{connect_recording, init_tracing, start_test_relay};
use crate::utils::{drain_for, wait_for};

#[tokio::test]
async fn test_identified_then_disconnected_once() {
    init_tracing();

    let addr = start_test_relay().await;
    let (first, mut first_rx) = connect_recording(addr).await;
    assert_eq!(first.state(), ConnectionState::Identified);

    let event = wait_for(&mut first_rx, |_| true).await.unwrap();
    assert_eq!(
        event,
        ClientEvent::Identified {
            peer_id: first.peer_id()
        }
    );
    assert!(first.mirror().await.is_connected(&first.peer_id()));

    let (second, mut second_rx) = connect_recording(addr).await;
    wait_for(&mut first_rx, |e| {
        *e == ClientEvent::PeerJoined {
            peer_id: second.peer_id(),
        }
    })
    .await
    .unwrap();
    assert!(first.mirror().await.is_connected(&second.peer_id()));

    let mut state = second.watch_state();
    second.sender().disconnect().unwrap();

    wait_for(&mut second_rx, |e| *e == ClientEvent::Disconnected)
        .await
        .unwrap();
    state
        .wait_for(|s| *s == ConnectionState::Disconnected)
        .await
        .unwrap();
    assert!(
        drain_for(&mut second_rx, 200)
            .await
            .iter()
            .all(|e| *e != ClientEvent::Disconnected)
    );

    wait_for(&mut first_rx, |e| {
        *e == ClientEvent::PeerLeft {
            peer_id: second.peer_id(),
        }
    })
    .await
    .unwrap();
    assert!(!first.mirror().await.is_connected(&second.peer_id()));
}

#[tokio::test]
async fn test_connect_to_closed_port_fails() {
    init_tracing();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);

    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    assert!(RelayClient::connect(addr, tx).await.is_err());
}
