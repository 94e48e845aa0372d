use crate::client::ClientContext;
use async_trait::async_trait;
use roomcast_core::{JoinFailure, PeerId, RoomId, RoomInfo, ServerFrame};
use serde::Serialize;
use tokio::sync::mpsc;

/// Everything the relay can tell a connected client, delivered after the
/// registry mirror has been updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    Identified { peer_id: PeerId },
    PeerJoined { peer_id: PeerId },
    PeerLeft { peer_id: PeerId },
    RoomAdded { room: RoomInfo },
    AddRoomFailed { name: String, capacity: u32 },
    RoomRemoved { room_id: RoomId },
    JoinedRoom { peer_id: PeerId, room_id: RoomId },
    JoinRoomFailed { reason: JoinFailure, room_id: RoomId },
    LeftRoom { peer_id: PeerId, room_id: RoomId },
    RoomOwner { room_id: RoomId, owner: Option<PeerId> },
    RoomClosed { room_id: RoomId },
    RoomOpened { room_id: RoomId },
    /// Application payload relayed from another peer.
    Message { from: PeerId, payload: String },
    InvalidCommand { word: String, original: String },
    /// Fired once when the stream ends. Nothing follows it.
    Disconnected,
}

impl ClientEvent {
    /// `None` for a repeated handshake, which carries nothing new.
    pub fn from_frame(frame: ServerFrame) -> Option<Self> {
        let event = match frame {
            ServerFrame::Handshake { .. } => return None,
            ServerFrame::PeerJoined(peer_id) => ClientEvent::PeerJoined { peer_id },
            ServerFrame::PeerLeft(peer_id) => ClientEvent::PeerLeft { peer_id },
            ServerFrame::RoomAdded(room) => ClientEvent::RoomAdded { room },
            ServerFrame::AddRoomFailed { name, capacity } => {
                ClientEvent::AddRoomFailed { name, capacity }
            }
            ServerFrame::RoomRemoved(room_id) => ClientEvent::RoomRemoved { room_id },
            ServerFrame::JoinedRoom { peer_id, room_id } => {
                ClientEvent::JoinedRoom { peer_id, room_id }
            }
            ServerFrame::JoinRoomFailed { reason, room_id } => {
                ClientEvent::JoinRoomFailed { reason, room_id }
            }
            ServerFrame::LeftRoom { peer_id, room_id } => ClientEvent::LeftRoom { peer_id, room_id },
            ServerFrame::RoomOwner { room_id, owner } => ClientEvent::RoomOwner { room_id, owner },
            ServerFrame::RoomClosed(room_id) => ClientEvent::RoomClosed { room_id },
            ServerFrame::RoomOpened(room_id) => ClientEvent::RoomOpened { room_id },
            ServerFrame::Relayed { from, payload } => ClientEvent::Message { from, payload },
            ServerFrame::InvalidCommand { word, original } => {
                ClientEvent::InvalidCommand { word, original }
            }
        };
        Some(event)
    }
}

/// Application callback surface. Called from the connection's single reader
/// task, one event at a time, in arrival order.
#[async_trait]
pub trait EventHandler: Send + 'static {
    async fn on_event(&mut self, ctx: &ClientContext, event: ClientEvent);
}

#[async_trait]
impl EventHandler for mpsc::UnboundedSender<ClientEvent> {
    async fn on_event(&mut self, _ctx: &ClientContext, event: ClientEvent) {
        let _ = self.send(event);
    }
}
