use crate::error::ClientError;
use bytes::Bytes;
use roomcast_core::protocol::token::{sanitize_name, single_line};
use roomcast_core::protocol::verb;
use roomcast_core::{ClientFrame, PeerId, ProtocolError, RoomId};
use tokio::sync::mpsc;

/// Write path of a connection. Every method only encodes a line and queues
/// it for the writer task; outcomes arrive later as events.
#[derive(Clone, Debug)]
pub struct ClientSender {
    peer_id: PeerId,
    tx: mpsc::UnboundedSender<Bytes>,
}

impl ClientSender {
    pub(crate) fn new(peer_id: PeerId, tx: mpsc::UnboundedSender<Bytes>) -> Self {
        Self { peer_id, tx }
    }

    /// Identity assigned to this connection by the relay.
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn send(&self, frame: &ClientFrame) -> Result<(), ClientError> {
        self.tx
            .send(Bytes::from(format!("{frame}\n")))
            .map_err(|_| ClientError::Closed)
    }

    pub fn send_to(&self, peer_id: PeerId, payload: &str) -> Result<(), ClientError> {
        let payload = checked_payload(payload, ProtocolError::MissingArgument { verb: verb::TO })?;
        self.send(&ClientFrame::SendTo { peer_id, payload })
    }

    pub fn send_to_room(&self, room_id: RoomId, payload: &str) -> Result<(), ClientError> {
        let payload = checked_payload(
            payload,
            ProtocolError::MissingArgument {
                verb: verb::TO_ROOM,
            },
        )?;
        self.send(&ClientFrame::SendToRoom { room_id, payload })
    }

    pub fn broadcast(&self, payload: &str) -> Result<(), ClientError> {
        let payload = checked_payload(payload, ProtocolError::Empty)?;
        self.send(&ClientFrame::Broadcast { payload })
    }

    pub fn add_room(&self, name: &str, capacity: u32) -> Result<(), ClientError> {
        self.send(&ClientFrame::AddRoom {
            name: sanitize_name(name),
            capacity,
        })
    }

    pub fn remove_room(&self, room_id: RoomId) -> Result<(), ClientError> {
        self.send(&ClientFrame::RemoveRoom { room_id })
    }

    pub fn join_room(&self, room_id: RoomId) -> Result<(), ClientError> {
        self.send(&ClientFrame::JoinRoom { room_id })
    }

    pub fn leave_room(&self, room_id: RoomId) -> Result<(), ClientError> {
        self.send(&ClientFrame::LeaveRoom { room_id })
    }

    pub fn close_room(&self, room_id: RoomId) -> Result<(), ClientError> {
        self.send(&ClientFrame::CloseRoom { room_id })
    }

    pub fn open_room(&self, room_id: RoomId) -> Result<(), ClientError> {
        self.send(&ClientFrame::OpenRoom { room_id })
    }

    /// Asks the relay to end the session. The relay closes the stream, which
    /// surfaces as `ClientEvent::Disconnected`.
    pub fn disconnect(&self) -> Result<(), ClientError> {
        self.send(&ClientFrame::Disconnect)
    }
}

/// Payloads travel as the tail of a line; one that starts with a reserved
/// word would be read as a command by the relay.
fn checked_payload(payload: &str, missing: ProtocolError) -> Result<String, ClientError> {
    let payload = single_line(payload);
    let payload = payload.trim();
    let Some(head) = payload.split_whitespace().next() else {
        return Err(missing.into());
    };
    if verb::is_reserved(head) {
        return Err(ProtocolError::ReservedWord {
            word: head.to_string(),
        }
        .into());
    }
    Ok(payload.to_string())
}
