use roomcast_client::{ClientEvent, ConnectionState};
use roomcast_core::{PeerId, RegistrySnapshot, ServerFrame};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use crate::integration::{connect_recording, init_tracing};
use crate::utils::wait_for;

#[tokio::test]
async fn test_non_utf8_server_line_is_skipped() {
    init_tracing();

    // Hand-driven relay so the stream can carry bytes a real one never sends.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let me = PeerId::new();
    let other = PeerId::new();

    let relay = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let handshake = ServerFrame::Handshake {
            peer_id: me,
            snapshot: RegistrySnapshot {
                peers: vec![me],
                rooms: Vec::new(),
                max_rooms: 4,
            },
        };
        stream
            .write_all(format!("{handshake}\n").as_bytes())
            .await
            .unwrap();
        stream.write_all(b"\xff\xfe JOINED\n").await.unwrap();
        stream
            .write_all(format!("{}\n", ServerFrame::PeerJoined(other)).as_bytes())
            .await
            .unwrap();
        stream
    });

    let (client, mut rx) = connect_recording(addr).await;
    assert_eq!(client.peer_id(), me);

    wait_for(&mut rx, |e| *e == ClientEvent::PeerJoined { peer_id: other })
        .await
        .unwrap();
    assert_eq!(client.state(), ConnectionState::Identified);
    assert!(client.mirror().await.is_connected(&other));

    drop(relay.await.unwrap());
    wait_for(&mut rx, |e| *e == ClientEvent::Disconnected)
        .await
        .unwrap();
    assert_eq!(client.state(), ConnectionState::Disconnected);
}
