use crate::model::PeerId;
use crate::protocol::ProtocolError;
use crate::protocol::token::{self, Tokens};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct RoomId(pub Uuid);

impl RoomId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for RoomId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reason carried by `JOIN_ROOM_FAIL`. Checked in declaration order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
pub enum JoinFailure {
    NoSuchRoom,
    Closed,
    Full,
}

impl JoinFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinFailure::NoSuchRoom => "NO_SUCH_ROOM",
            JoinFailure::Closed => "CLOSED",
            JoinFailure::Full => "FULL",
        }
    }
}

impl fmt::Display for JoinFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinFailure {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NO_SUCH_ROOM" => Ok(JoinFailure::NoSuchRoom),
            "CLOSED" => Ok(JoinFailure::Closed),
            "FULL" => Ok(JoinFailure::Full),
            other => Err(ProtocolError::Unrecognized(other.to_string())),
        }
    }
}

/// Full description of one room as carried by `ROOM_ADDED` and the handshake
/// snapshot.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
pub struct RoomInfo {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    pub owner: Option<PeerId>,
    pub closed: bool,
    pub members: BTreeSet<PeerId>,
}

impl RoomInfo {
    /// A freshly registered room: open, ownerless and empty.
    pub fn new(id: RoomId, name: &str, capacity: u32) -> Self {
        Self {
            id,
            name: token::sanitize_name(name),
            capacity,
            owner: None,
            closed: false,
            members: BTreeSet::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity as usize
    }

    /// `roomId name capacity ownerId closed`, without members.
    pub(crate) fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.id,
            self.name,
            self.capacity,
            token::OptionalPeer(self.owner),
            self.closed
        )
    }

    /// Reads the five header tokens shared by `ROOM_ADDED` and snapshot groups.
    pub(crate) fn read_header(
        verb: &'static str,
        tokens: &mut Tokens<'_>,
    ) -> Result<Self, ProtocolError> {
        let id = tokens.room_id(verb)?;
        let name = tokens.word(verb)?.to_string();
        let capacity = tokens.number(verb)?;
        let owner = tokens.optional_peer(verb)?;
        let closed = tokens.flag(verb)?;

        Ok(Self {
            id,
            name,
            capacity,
            owner,
            closed,
            members: BTreeSet::new(),
        })
    }
}
