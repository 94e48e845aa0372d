use crate::model::{PeerId, RoomInfo};
use crate::protocol::ProtocolError;
use crate::protocol::token::{Tokens, parse_peer};
use crate::protocol::verb::ID;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Full registry state handed to a peer once, inside its handshake line.
///
/// Encoded as `peerIdList|roomList|maxRooms`: peer ids are comma-separated,
/// rooms are comma-separated groups of `roomId name capacity ownerId closed
/// member*`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Eq, PartialEq)]
pub struct RegistrySnapshot {
    pub peers: Vec<PeerId>,
    pub rooms: Vec<RoomInfo>,
    pub max_rooms: usize,
}

impl fmt::Display for RegistrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, peer) in self.peers.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", peer)?;
        }
        f.write_str("|")?;

        for (i, room) in self.rooms.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            room.write_header(f)?;
            for member in &room.members {
                write!(f, " {}", member)?;
            }
        }

        write!(f, "|{}", self.max_rooms)
    }
}

impl FromStr for RegistrySnapshot {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut sections = s.trim().splitn(3, '|');
        let (Some(peers), Some(rooms), Some(max_rooms)) =
            (sections.next(), sections.next(), sections.next())
        else {
            return Err(ProtocolError::MalformedSnapshot(format!(
                "expected three `|` sections in `{s}`"
            )));
        };

        let peers = peers
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| parse_peer(ID, p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut parsed_rooms = Vec::new();
        for group in rooms.split(',').filter(|g| !g.trim().is_empty()) {
            let mut tokens = Tokens::new(group);
            let mut room = RoomInfo::read_header(ID, &mut tokens)?;
            for member in tokens.rest() {
                room.members.insert(parse_peer(ID, member)?);
            }
            parsed_rooms.push(room);
        }

        let max_rooms = max_rooms.trim().parse().map_err(|_| {
            ProtocolError::MalformedSnapshot(format!("bad room cap `{max_rooms}`"))
        })?;

        Ok(Self {
            peers,
            rooms: parsed_rooms,
            max_rooms,
        })
    }
}
