use crate::registry::{Relay, encode};
use roomcast_core::protocol::token::decode_line;
use roomcast_core::{ClientFrame, PeerId, ProtocolError, ServerFrame};
use std::ops::ControlFlow;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

/// Serves one peer for the lifetime of its TCP connection.
///
/// The peer is registered, sent its handshake, and then driven by two tasks:
/// one draining its outbound queue onto the socket, one reading and
/// dispatching its lines. Whichever ends first stops the other, and the peer
/// is then disconnected from the registry.
pub async fn handle_connection(stream: TcpStream, relay: Relay) {
    let remote = stream.peer_addr().ok();
    let (reader, mut writer) = stream.into_split();

    let (peer_id, mut rx) = relay.register_peer();
    info!("New connection from {:?} as {}", remote, peer_id);

    // Frames raised after registration wait in `rx` until the handshake is out.
    let snapshot = relay.snapshot().await;
    let handshake = encode(&ServerFrame::Handshake { peer_id, snapshot });
    if let Err(e) = writer.write_all(&handshake).await {
        warn!("Failed to send handshake to {}: {}", peer_id, e);
        relay.disconnect(peer_id).await;
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(&line).await.is_err() {
                break;
            }
        }
        let _ = writer.shutdown().await;
    });

    let mut recv_task = tokio::spawn({
        let relay = relay.clone();

        async move {
            let mut reader = BufReader::new(reader);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => match decode_line(&buf) {
                        Ok(line) => {
                            if dispatch(&relay, peer_id, line).await.is_break() {
                                break;
                            }
                        }
                        Err(lossy) => {
                            let error = ProtocolError::invalid_encoding(&lossy);
                            debug!("Invalid frame from {}: {}", peer_id, error);
                            relay.reject(peer_id, &error, &lossy);
                        }
                    },
                    Err(e) => {
                        debug!("Read error from {}: {}", peer_id, e);
                        break;
                    }
                }
            }
        }
    });

    tokio::select! {
        res = (&mut send_task) => {
            recv_task.abort();
            if let Err(e) = res {
                error!("Writer for {} failed: {}", peer_id, e);
            }
        }
        res = (&mut recv_task) => {
            send_task.abort();
            if let Err(e) = res
                && e.is_panic()
            {
                error!("Handler for {} panicked: {}", peer_id, e);
            }
        }
    };

    relay.disconnect(peer_id).await;
    info!("Connection closed: {}", peer_id);
}

/// Applies one inbound line on behalf of `peer_id`.
pub async fn dispatch(relay: &Relay, peer_id: PeerId, line: &str) -> ControlFlow<()> {
    if line.trim().is_empty() {
        return ControlFlow::Continue(());
    }

    let frame = match ClientFrame::parse(line) {
        Ok(frame) => frame,
        Err(e) => {
            debug!("Invalid frame from {}: {}", peer_id, e);
            relay.reject(peer_id, &e, line);
            return ControlFlow::Continue(());
        }
    };

    match frame {
        ClientFrame::SendTo {
            peer_id: to,
            payload,
        } => relay.send_to(peer_id, to, &payload),
        ClientFrame::SendToRoom { room_id, payload } => {
            relay.send_to_room(peer_id, room_id, &payload).await
        }
        ClientFrame::Broadcast { payload } => relay.broadcast_from(peer_id, &payload),
        ClientFrame::AddRoom { name, capacity } => {
            relay.add_room(peer_id, &name, capacity);
        }
        ClientFrame::RemoveRoom { room_id } => relay.remove_room(room_id).await,
        ClientFrame::JoinRoom { room_id } => relay.join_room(peer_id, room_id).await,
        ClientFrame::LeaveRoom { room_id } => relay.leave_room(peer_id, room_id).await,
        ClientFrame::CloseRoom { room_id } => relay.close_room(room_id).await,
        ClientFrame::OpenRoom { room_id } => relay.open_room(room_id).await,
        ClientFrame::Disconnect => return ControlFlow::Break(()),
    }

    ControlFlow::Continue(())
}
