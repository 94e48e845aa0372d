use bytes::Bytes;
use dashmap::DashMap;
use roomcast_core::{PeerId, RoomId, ServerFrame};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Registry record for one connected peer.
#[derive(Debug, Clone)]
pub struct PeerEntry {
    /// Write path of the peer's connection; drained by its writer task.
    pub outbound: mpsc::UnboundedSender<Bytes>,
    /// Reverse index: the room this peer is currently a member of.
    pub room: Option<RoomId>,
}

impl PeerEntry {
    pub fn new(outbound: mpsc::UnboundedSender<Bytes>) -> Self {
        Self {
            outbound,
            room: None,
        }
    }
}

/// One frame as it travels on the wire, newline included.
pub fn encode(frame: &ServerFrame) -> Bytes {
    Bytes::from(format!("{frame}\n"))
}

/// Connected peers and their write paths, shared by the relay and every
/// room actor. Holds no reference back to rooms, so room actors stop once
/// the relay that spawned them is dropped.
#[derive(Clone, Default)]
pub struct PeerDirectory {
    peers: Arc<DashMap<PeerId, PeerEntry>>,
}

impl PeerDirectory {
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn ids(&self) -> Vec<PeerId> {
        self.peers.iter().map(|entry| *entry.key()).collect()
    }

    pub fn room_of(&self, peer_id: &PeerId) -> Option<RoomId> {
        self.peers.get(peer_id).and_then(|entry| entry.room)
    }

    pub fn insert(&self, peer_id: PeerId, entry: PeerEntry) {
        self.peers.insert(peer_id, entry);
    }

    pub fn remove(&self, peer_id: &PeerId) -> Option<PeerEntry> {
        self.peers.remove(peer_id).map(|(_, entry)| entry)
    }

    /// Records the peer's room. `false` if the peer is no longer connected.
    pub fn set_room(&self, peer_id: PeerId, room_id: RoomId) -> bool {
        match self.peers.get_mut(&peer_id) {
            Some(mut entry) => {
                entry.room = Some(room_id);
                true
            }
            None => false,
        }
    }

    /// Clears the peer's room, unless it has already moved elsewhere.
    pub fn clear_room(&self, peer_id: PeerId, room_id: RoomId) {
        if let Some(mut entry) = self.peers.get_mut(&peer_id)
            && entry.room == Some(room_id)
        {
            entry.room = None;
        }
    }

    pub fn send_frame(&self, peer_id: PeerId, frame: &ServerFrame) -> bool {
        self.deliver(peer_id, encode(frame))
    }

    pub fn deliver(&self, peer_id: PeerId, line: Bytes) -> bool {
        let Some(outbound) = self
            .peers
            .get(&peer_id)
            .map(|entry| entry.outbound.clone())
        else {
            return false;
        };
        outbound.send(line).is_ok()
    }

    /// Best-effort fan-out to every connected peer. Recipients are taken from
    /// a snapshot so no map guard is held while sending.
    pub fn broadcast(&self, frame: &ServerFrame, except: Option<PeerId>) {
        let line = encode(frame);
        let recipients: Vec<mpsc::UnboundedSender<Bytes>> = self
            .peers
            .iter()
            .filter(|entry| Some(*entry.key()) != except)
            .map(|entry| entry.outbound.clone())
            .collect();

        for outbound in recipients {
            let _ = outbound.send(line.clone());
        }
    }
}
