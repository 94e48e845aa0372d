use crate::model::{PeerId, RoomId};
use crate::protocol::ProtocolError;
use crate::protocol::token::{self, Tokens, split_head};
use crate::protocol::verb::{self, *};
use std::fmt;
use std::str::FromStr;

/// One line sent by a client to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// `TO peerId payload`
    SendTo { peer_id: PeerId, payload: String },
    /// `TO_ROOM roomId payload`
    SendToRoom { room_id: RoomId, payload: String },
    /// Bare payload, relayed to every peer.
    Broadcast { payload: String },
    AddRoom { name: String, capacity: u32 },
    RemoveRoom { room_id: RoomId },
    JoinRoom { room_id: RoomId },
    LeaveRoom { room_id: RoomId },
    CloseRoom { room_id: RoomId },
    OpenRoom { room_id: RoomId },
    Disconnect,
}

impl ClientFrame {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (head, rest) = split_head(line);

        match head {
            "" => Err(ProtocolError::Empty),
            TO => {
                let (target, payload) = split_head(rest);
                let peer_id = Tokens::new(target).peer_id(TO)?;
                Ok(ClientFrame::SendTo {
                    peer_id,
                    payload: check_payload(TO, payload)?,
                })
            }
            TO_ROOM => {
                let (target, payload) = split_head(rest);
                let room_id = Tokens::new(target).room_id(TO_ROOM)?;
                Ok(ClientFrame::SendToRoom {
                    room_id,
                    payload: check_payload(TO_ROOM, payload)?,
                })
            }
            ADD_ROOM => {
                // The capacity is the last token; everything before it is the name.
                let (name, capacity) = rest
                    .trim_end()
                    .rsplit_once(' ')
                    .ok_or(ProtocolError::MissingArgument { verb: ADD_ROOM })?;
                let capacity = Tokens::new(capacity).number(ADD_ROOM)?;
                Ok(ClientFrame::AddRoom {
                    name: token::sanitize_name(name),
                    capacity,
                })
            }
            REMOVE_ROOM => Ok(ClientFrame::RemoveRoom {
                room_id: Tokens::new(rest).room_id(REMOVE_ROOM)?,
            }),
            JOIN_ROOM => Ok(ClientFrame::JoinRoom {
                room_id: Tokens::new(rest).room_id(JOIN_ROOM)?,
            }),
            LEAVE_ROOM => Ok(ClientFrame::LeaveRoom {
                room_id: Tokens::new(rest).room_id(LEAVE_ROOM)?,
            }),
            CLOSE_ROOM => Ok(ClientFrame::CloseRoom {
                room_id: Tokens::new(rest).room_id(CLOSE_ROOM)?,
            }),
            OPEN_ROOM => Ok(ClientFrame::OpenRoom {
                room_id: Tokens::new(rest).room_id(OPEN_ROOM)?,
            }),
            DC => Ok(ClientFrame::Disconnect),
            word if verb::is_reserved(word) => Err(ProtocolError::ReservedWord {
                word: word.to_string(),
            }),
            _ => Ok(ClientFrame::Broadcast {
                payload: line.trim().to_string(),
            }),
        }
    }
}

/// Relayed payloads are delivered as `senderId payload`; a leading reserved
/// word would make that line ambiguous for the recipient.
fn check_payload(verb: &'static str, payload: &str) -> Result<String, ProtocolError> {
    let payload = payload.trim_end();
    let (head, _) = split_head(payload);
    if head.is_empty() {
        return Err(ProtocolError::MissingArgument { verb });
    }
    if verb::is_reserved(head) {
        return Err(ProtocolError::ReservedWord {
            word: head.to_string(),
        });
    }
    Ok(payload.to_string())
}

impl FromStr for ClientFrame {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ClientFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientFrame::SendTo { peer_id, payload } => write!(f, "{TO} {peer_id} {payload}"),
            ClientFrame::SendToRoom { room_id, payload } => {
                write!(f, "{TO_ROOM} {room_id} {payload}")
            }
            ClientFrame::Broadcast { payload } => f.write_str(payload),
            ClientFrame::AddRoom { name, capacity } => write!(f, "{ADD_ROOM} {name} {capacity}"),
            ClientFrame::RemoveRoom { room_id } => write!(f, "{REMOVE_ROOM} {room_id}"),
            ClientFrame::JoinRoom { room_id } => write!(f, "{JOIN_ROOM} {room_id}"),
            ClientFrame::LeaveRoom { room_id } => write!(f, "{LEAVE_ROOM} {room_id}"),
            ClientFrame::CloseRoom { room_id } => write!(f, "{CLOSE_ROOM} {room_id}"),
            ClientFrame::OpenRoom { room_id } => write!(f, "{OPEN_ROOM} {room_id}"),
            ClientFrame::Disconnect => f.write_str(DC),
        }
    }
}
