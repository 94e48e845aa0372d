use crate::model::{JoinFailure, PeerId, RegistrySnapshot, RoomId, RoomInfo};
use crate::protocol::ProtocolError;
use crate::protocol::token::{OptionalPeer, Tokens, parse_peer, split_head};
use crate::protocol::verb::*;
use std::fmt;
use std::str::FromStr;

/// One line sent by the relay to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    /// `peerId ID peerId snapshot`, always the first line on a connection.
    Handshake {
        peer_id: PeerId,
        snapshot: RegistrySnapshot,
    },
    PeerJoined(PeerId),
    PeerLeft(PeerId),
    /// Members are never carried; a new room is empty.
    RoomAdded(RoomInfo),
    AddRoomFailed { name: String, capacity: u32 },
    RoomRemoved(RoomId),
    JoinedRoom { peer_id: PeerId, room_id: RoomId },
    JoinRoomFailed { reason: JoinFailure, room_id: RoomId },
    LeftRoom { peer_id: PeerId, room_id: RoomId },
    RoomOwner { room_id: RoomId, owner: Option<PeerId> },
    RoomClosed(RoomId),
    RoomOpened(RoomId),
    /// `senderId payload`
    Relayed { from: PeerId, payload: String },
    InvalidCommand { word: String, original: String },
}

impl ServerFrame {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (head, rest) = split_head(line);
        let mut args = Tokens::new(rest);

        let frame = match head {
            "" => return Err(ProtocolError::Empty),
            ROOM_ADDED => ServerFrame::RoomAdded(RoomInfo::read_header(ROOM_ADDED, &mut args)?),
            ADD_ROOM_FAILED => ServerFrame::AddRoomFailed {
                name: args.word(ADD_ROOM_FAILED)?.to_string(),
                capacity: args.number(ADD_ROOM_FAILED)?,
            },
            ROOM_REMOVED => ServerFrame::RoomRemoved(args.room_id(ROOM_REMOVED)?),
            JOINED_ROOM => ServerFrame::JoinedRoom {
                peer_id: args.peer_id(JOINED_ROOM)?,
                room_id: args.room_id(JOINED_ROOM)?,
            },
            JOIN_ROOM_FAIL => ServerFrame::JoinRoomFailed {
                reason: args.word(JOIN_ROOM_FAIL)?.parse()?,
                room_id: args.room_id(JOIN_ROOM_FAIL)?,
            },
            LEFT_ROOM => ServerFrame::LeftRoom {
                peer_id: args.peer_id(LEFT_ROOM)?,
                room_id: args.room_id(LEFT_ROOM)?,
            },
            ROOM_OWNER => ServerFrame::RoomOwner {
                room_id: args.room_id(ROOM_OWNER)?,
                owner: args.optional_peer(ROOM_OWNER)?,
            },
            ROOM_CLOSED => ServerFrame::RoomClosed(args.room_id(ROOM_CLOSED)?),
            ROOM_OPENED => ServerFrame::RoomOpened(args.room_id(ROOM_OPENED)?),
            INVALID_CMD => {
                let (word, original) = split_head(rest);
                ServerFrame::InvalidCommand {
                    word: word.to_string(),
                    original: original.to_string(),
                }
            }
            sender => {
                let from = parse_peer(ID, sender)
                    .map_err(|_| ProtocolError::Unrecognized(sender.to_string()))?;
                let (second, tail) = split_head(rest);
                match second {
                    ID => {
                        let (assigned, snapshot) = split_head(tail);
                        ServerFrame::Handshake {
                            peer_id: parse_peer(ID, assigned)?,
                            snapshot: snapshot.parse()?,
                        }
                    }
                    JOINED => ServerFrame::PeerJoined(from),
                    DC => ServerFrame::PeerLeft(from),
                    "" => return Err(ProtocolError::MissingArgument { verb: ID }),
                    _ => ServerFrame::Relayed {
                        from,
                        payload: rest.trim_end().to_string(),
                    },
                }
            }
        };

        Ok(frame)
    }
}

impl FromStr for ServerFrame {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ServerFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerFrame::Handshake { peer_id, snapshot } => {
                write!(f, "{peer_id} {ID} {peer_id} {snapshot}")
            }
            ServerFrame::PeerJoined(peer_id) => write!(f, "{peer_id} {JOINED}"),
            ServerFrame::PeerLeft(peer_id) => write!(f, "{peer_id} {DC}"),
            ServerFrame::RoomAdded(room) => {
                write!(f, "{ROOM_ADDED} ")?;
                room.write_header(f)
            }
            ServerFrame::AddRoomFailed { name, capacity } => {
                write!(f, "{ADD_ROOM_FAILED} {name} {capacity}")
            }
            ServerFrame::RoomRemoved(room_id) => write!(f, "{ROOM_REMOVED} {room_id}"),
            ServerFrame::JoinedRoom { peer_id, room_id } => {
                write!(f, "{JOINED_ROOM} {peer_id} {room_id}")
            }
            ServerFrame::JoinRoomFailed { reason, room_id } => {
                write!(f, "{JOIN_ROOM_FAIL} {reason} {room_id}")
            }
            ServerFrame::LeftRoom { peer_id, room_id } => {
                write!(f, "{LEFT_ROOM} {peer_id} {room_id}")
            }
            ServerFrame::RoomOwner { room_id, owner } => {
                write!(f, "{ROOM_OWNER} {room_id} {}", OptionalPeer(*owner))
            }
            ServerFrame::RoomClosed(room_id) => write!(f, "{ROOM_CLOSED} {room_id}"),
            ServerFrame::RoomOpened(room_id) => write!(f, "{ROOM_OPENED} {room_id}"),
            ServerFrame::Relayed { from, payload } => write!(f, "{from} {payload}"),
            ServerFrame::InvalidCommand { word, original } => {
                write!(f, "{INVALID_CMD} {word} {original}")
            }
        }
    }
}
