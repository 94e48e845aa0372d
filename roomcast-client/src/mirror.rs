use roomcast_core::{PeerId, RegistrySnapshot, RoomId, RoomInfo, ServerFrame};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Client-side copy of the relay's registry.
///
/// Seeded from the handshake snapshot and kept current by applying every
/// later frame in arrival order. Frames raised between the server building
/// the snapshot and sending it can repeat state the snapshot already holds,
/// so every update is idempotent.
#[derive(Debug, Clone)]
pub struct RegistryMirror {
    self_id: PeerId,
    peers: BTreeSet<PeerId>,
    rooms: BTreeMap<RoomId, RoomInfo>,
    /// Reverse index: room containing each peer.
    peer_rooms: HashMap<PeerId, RoomId>,
    max_rooms: usize,
}

impl RegistryMirror {
    pub fn from_snapshot(self_id: PeerId, snapshot: RegistrySnapshot) -> Self {
        let mut peer_rooms = HashMap::new();
        for room in &snapshot.rooms {
            for member in &room.members {
                peer_rooms.insert(*member, room.id);
            }
        }

        let mut peers: BTreeSet<PeerId> = snapshot.peers.into_iter().collect();
        peers.insert(self_id);

        Self {
            self_id,
            peers,
            rooms: snapshot.rooms.into_iter().map(|r| (r.id, r)).collect(),
            peer_rooms,
            max_rooms: snapshot.max_rooms,
        }
    }

    pub fn self_id(&self) -> PeerId {
        self.self_id
    }

    pub fn max_rooms(&self) -> usize {
        self.max_rooms
    }

    pub fn peers(&self) -> impl Iterator<Item = &PeerId> {
        self.peers.iter()
    }

    pub fn is_connected(&self, peer_id: &PeerId) -> bool {
        self.peers.contains(peer_id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &RoomInfo> {
        self.rooms.values()
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&RoomInfo> {
        self.rooms.get(room_id)
    }

    pub fn room_of(&self, peer_id: &PeerId) -> Option<RoomId> {
        self.peer_rooms.get(peer_id).copied()
    }

    /// The room this client is currently in.
    pub fn current_room(&self) -> Option<&RoomInfo> {
        self.room_of(&self.self_id)
            .and_then(|room_id| self.rooms.get(&room_id))
    }

    pub fn owner_of(&self, room_id: &RoomId) -> Option<PeerId> {
        self.rooms.get(room_id).and_then(|room| room.owner)
    }

    pub fn is_closed(&self, room_id: &RoomId) -> bool {
        self.rooms.get(room_id).is_some_and(|room| room.closed)
    }

    pub fn apply(&mut self, frame: &ServerFrame) {
        match frame {
            ServerFrame::Handshake { .. }
            | ServerFrame::AddRoomFailed { .. }
            | ServerFrame::JoinRoomFailed { .. }
            | ServerFrame::Relayed { .. }
            | ServerFrame::InvalidCommand { .. } => {}

            ServerFrame::PeerJoined(peer_id) => {
                self.peers.insert(*peer_id);
            }

            ServerFrame::PeerLeft(peer_id) => {
                self.peers.remove(peer_id);
                if let Some(room_id) = self.peer_rooms.remove(peer_id) {
                    self.drop_member(*peer_id, room_id);
                }
            }

            ServerFrame::RoomAdded(info) => {
                // A snapshot entry is at least as fresh as the announcement.
                self.rooms.entry(info.id).or_insert_with(|| info.clone());
            }

            ServerFrame::RoomRemoved(room_id) => {
                if let Some(room) = self.rooms.remove(room_id) {
                    for member in room.members {
                        self.peer_rooms.remove(&member);
                    }
                }
            }

            ServerFrame::JoinedRoom { peer_id, room_id } => {
                if !self.rooms.contains_key(room_id) {
                    return;
                }
                if let Some(previous) = self.peer_rooms.insert(*peer_id, *room_id)
                    && previous != *room_id
                {
                    self.drop_member(*peer_id, previous);
                }
                if let Some(room) = self.rooms.get_mut(room_id) {
                    room.members.insert(*peer_id);
                }
            }

            ServerFrame::LeftRoom { peer_id, room_id } => {
                if self.peer_rooms.get(peer_id) == Some(room_id) {
                    self.peer_rooms.remove(peer_id);
                }
                self.drop_member(*peer_id, *room_id);
            }

            ServerFrame::RoomOwner { room_id, owner } => {
                if let Some(room) = self.rooms.get_mut(room_id) {
                    room.owner = *owner;
                }
            }

            ServerFrame::RoomClosed(room_id) => self.set_closed(room_id, true),

            ServerFrame::RoomOpened(room_id) => self.set_closed(room_id, false),
        }
    }

    fn drop_member(&mut self, peer_id: PeerId, room_id: RoomId) {
        if let Some(room) = self.rooms.get_mut(&room_id) {
            room.members.remove(&peer_id);
        }
    }

    fn set_closed(&mut self, room_id: &RoomId, closed: bool) {
        if let Some(room) = self.rooms.get_mut(room_id) {
            room.closed = closed;
        }
    }
}
