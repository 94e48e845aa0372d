use roomcast_core::ServerFrame;
use roomcast_server::RelayConfig;
use std::net::SocketAddr;

use crate::integration::{init_tracing, start_relay_with, start_test_relay};
use crate::utils::TestClient;

#[tokio::test]
async fn test_bare_text_is_broadcast_to_others() {
    init_tracing();

    let (addr, _relay) = start_test_relay(5).await;
    let mut alice = TestClient::connect(addr).await.unwrap();
    let mut bob = TestClient::connect(addr).await.unwrap();
    let mut carol = TestClient::connect(addr).await.unwrap();
    alice
        .wait_for_frame(&ServerFrame::PeerJoined(carol.peer_id))
        .await
        .unwrap();
    bob.wait_for_frame(&ServerFrame::PeerJoined(carol.peer_id))
        .await
        .unwrap();

    alice.send_line("chat gg wp").await.unwrap();

    let expected = ServerFrame::Relayed {
        from: alice.peer_id,
        payload: "chat gg wp".into(),
    };
    assert_eq!(bob.next_frame().await.unwrap(), expected);
    assert_eq!(carol.next_frame().await.unwrap(), expected);
    alice.expect_silence(200).await.unwrap();
}

#[tokio::test]
async fn test_echo_delivers_to_sender() {
    init_tracing();

    let (addr, _relay) = start_relay_with(RelayConfig {
        bind: SocketAddr::from(([127, 0, 0, 1], 0)),
        max_rooms: 5,
        echo: true,
    })
    .await;
    let mut alice = TestClient::connect(addr).await.unwrap();

    alice.send_line("ping").await.unwrap();
    assert_eq!(
        alice.next_frame().await.unwrap(),
        ServerFrame::Relayed {
            from: alice.peer_id,
            payload: "ping".into()
        }
    );
}

#[tokio::test]
async fn test_rapid_broadcasts_keep_order() {
    init_tracing();

    let (addr, _relay) = start_test_relay(5).await;
    let mut alice = TestClient::connect(addr).await.unwrap();
    let mut bob = TestClient::connect(addr).await.unwrap();
    alice
        .wait_for_frame(&ServerFrame::PeerJoined(bob.peer_id))
        .await
        .unwrap();

    for i in 0..100 {
        alice.send_line(&format!("tick {i}")).await.unwrap();
    }

    for i in 0..100 {
        assert_eq!(
            bob.next_frame().await.unwrap(),
            ServerFrame::Relayed {
                from: alice.peer_id,
                payload: format!("tick {i}")
            }
        );
    }
}
