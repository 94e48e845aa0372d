use crate::config::RelayConfig;
use crate::registry::peer::{PeerDirectory, PeerEntry, encode};
use crate::registry::room::{Room, RoomHandle};
use crate::registry::room_command::RoomCommand;
use bytes::Bytes;
use dashmap::DashMap;
use futures::future::join_all;
use roomcast_core::protocol::token::single_line;
use roomcast_core::{
    JoinFailure, PeerId, ProtocolError, RegistrySnapshot, RoomId, RoomInfo, ServerFrame,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct RelayInner {
    peers: PeerDirectory,
    rooms: DashMap<RoomId, RoomHandle>,
    /// Rooms registered or reserved; bounded by `config.max_rooms`.
    room_count: AtomicUsize,
    config: RelayConfig,
}

/// Authoritative peer/room registry plus the delivery primitives built on it.
///
/// Peers and room handles live in concurrent maps keyed by id; each room's
/// state is owned by its own actor task (see [`Room`]).
#[derive(Clone)]
pub struct Relay {
    inner: Arc<RelayInner>,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                peers: PeerDirectory::default(),
                rooms: DashMap::new(),
                room_count: AtomicUsize::new(0),
                config,
            }),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.len()
    }

    pub fn room_count(&self) -> usize {
        self.inner.rooms.len()
    }

    pub fn is_connected(&self, peer_id: &PeerId) -> bool {
        self.inner.peers.contains(peer_id)
    }

    /// Room the peer is currently a member of.
    pub fn room_of(&self, peer_id: &PeerId) -> Option<RoomId> {
        self.inner.peers.room_of(peer_id)
    }

    /// Assigns an identity to a new connection and announces it to everyone
    /// else. Frames for the peer queue up on the returned receiver.
    pub fn register_peer(&self) -> (PeerId, mpsc::UnboundedReceiver<Bytes>) {
        let peer_id = PeerId::new();
        let (tx, rx) = mpsc::unbounded_channel();

        self.inner.peers.insert(peer_id, PeerEntry::new(tx));
        info!("Peer {} registered ({} online)", peer_id, self.peer_count());

        self.inner.peers.broadcast(&ServerFrame::PeerJoined(peer_id), Some(peer_id));
        (peer_id, rx)
    }

    /// Removes the peer, makes it leave its room and announces the
    /// departure. Only the first call for a given peer does anything.
    pub async fn disconnect(&self, peer_id: PeerId) -> bool {
        let Some(entry) = self.inner.peers.remove(&peer_id) else {
            return false;
        };

        if let Some(room_id) = entry.room {
            self.leave_room(peer_id, room_id).await;
        }

        self.inner.peers.broadcast(&ServerFrame::PeerLeft(peer_id), None);
        info!("Peer {} disconnected ({} online)", peer_id, self.peer_count());
        true
    }

    pub async fn snapshot(&self) -> RegistrySnapshot {
        let peers = self.inner.peers.ids();

        // Collect the handles first so no map guard is held across awaits.
        let handles: Vec<RoomHandle> = self
            .inner
            .rooms
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let rooms = join_all(
            handles
                .iter()
                .map(|handle| handle.request(|reply| RoomCommand::Describe { reply })),
        )
        .await
        .into_iter()
        .flatten()
        .collect();

        RegistrySnapshot {
            peers,
            rooms,
            max_rooms: self.inner.config.max_rooms,
        }
    }

    pub async fn describe_room(&self, room_id: RoomId) -> Option<RoomInfo> {
        let handle = self.room_handle(room_id)?;
        handle
            .request(|reply| RoomCommand::Describe { reply })
            .await
    }

    /// Registers an open, ownerless, empty room. On failure only the
    /// requester hears about it.
    pub fn add_room(&self, requester: PeerId, name: &str, capacity: u32) -> Option<RoomId> {
        let max_rooms = self.inner.config.max_rooms;
        let reserved = capacity > 0
            && self
                .inner
                .room_count
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                    (count < max_rooms).then_some(count + 1)
                })
                .is_ok();

        let info = RoomInfo::new(RoomId::new(), name, capacity);

        if !reserved {
            warn!(
                "Rejected room {} (capacity {}) requested by {}",
                info.name, capacity, requester
            );
            self.inner.peers.send_frame(
                requester,
                &ServerFrame::AddRoomFailed {
                    name: info.name,
                    capacity,
                },
            );
            return None;
        }

        let room_id = info.id;
        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(Room::new(info.clone(), rx, self.inner.peers.clone()).run());
        self.inner.rooms.insert(room_id, RoomHandle::new(tx));

        info!(
            "Room {} ({}, capacity {}) created by {}",
            room_id, info.name, capacity, requester
        );
        self.inner.peers.broadcast(&ServerFrame::RoomAdded(info), None);
        Some(room_id)
    }

    /// Moves the peer into the room, leaving its current room first.
    pub async fn join_room(&self, peer_id: PeerId, room_id: RoomId) {
        let current = self.room_of(&peer_id);
        if current == Some(room_id) {
            debug!("Peer {} is already in room {}", peer_id, room_id);
            return;
        }

        let Some(handle) = self.room_handle(room_id) else {
            self.reject_join(peer_id, room_id, JoinFailure::NoSuchRoom);
            return;
        };

        if let Some(previous) = current {
            self.leave_room(peer_id, previous).await;
        }

        let outcome = handle
            .request(|reply| RoomCommand::Join { peer_id, reply })
            .await
            // The actor stopped: the room was removed while we were queued.
            .unwrap_or(Err(JoinFailure::NoSuchRoom));

        if let Err(reason) = outcome {
            self.reject_join(peer_id, room_id, reason);
        }
    }

    pub async fn leave_room(&self, peer_id: PeerId, room_id: RoomId) {
        let Some(handle) = self.room_handle(room_id) else {
            debug!("Peer {} left unknown room {}", peer_id, room_id);
            return;
        };

        let was_member = handle
            .request(|reply| RoomCommand::Leave { peer_id, reply })
            .await
            .unwrap_or(false);

        if !was_member {
            debug!("Peer {} is not a member of room {}", peer_id, room_id);
        }
    }

    /// Evicts every member (each with its own departure events), then
    /// unregisters the room.
    pub async fn remove_room(&self, room_id: RoomId) {
        let Some((_, handle)) = self.inner.rooms.remove(&room_id) else {
            debug!("Ignoring removal of unknown room {}", room_id);
            return;
        };

        handle.request(|reply| RoomCommand::Remove { reply }).await;
        self.inner.room_count.fetch_sub(1, Ordering::AcqRel);

        info!("Room {} removed", room_id);
        self.inner.peers.broadcast(&ServerFrame::RoomRemoved(room_id), None);
    }

    pub async fn close_room(&self, room_id: RoomId) {
        self.send_room_command(room_id, RoomCommand::Close).await;
    }

    pub async fn open_room(&self, room_id: RoomId) {
        self.send_room_command(room_id, RoomCommand::Open).await;
    }

    /// Unicast of an application payload.
    pub fn send_to(&self, from: PeerId, to: PeerId, payload: &str) {
        let line = encode(&ServerFrame::Relayed {
            from,
            payload: payload.to_string(),
        });
        if !self.inner.peers.deliver(to, line) {
            debug!("Dropped payload from {} to unknown peer {}", from, to);
        }
    }

    /// Room-cast of an application payload to the room's current members.
    pub async fn send_to_room(&self, from: PeerId, room_id: RoomId, payload: &str) {
        let line = encode(&ServerFrame::Relayed {
            from,
            payload: payload.to_string(),
        });
        let cmd = RoomCommand::Cast {
            from,
            line,
            include_sender: self.inner.config.echo,
        };
        self.send_room_command(room_id, cmd).await;
    }

    /// Global broadcast of an application payload.
    pub fn broadcast_from(&self, from: PeerId, payload: &str) {
        let frame = ServerFrame::Relayed {
            from,
            payload: payload.to_string(),
        };
        let except = (!self.inner.config.echo).then_some(from);
        self.inner.peers.broadcast(&frame, except);
    }

    /// Tells the offending peer its frame was not understood.
    pub fn reject(&self, peer_id: PeerId, error: &ProtocolError, original: &str) {
        self.inner.peers.send_frame(
            peer_id,
            &ServerFrame::InvalidCommand {
                word: error.word().to_string(),
                original: single_line(original),
            },
        );
    }

    fn reject_join(&self, peer_id: PeerId, room_id: RoomId, reason: JoinFailure) {
        debug!("Peer {} refused from room {}: {}", peer_id, room_id, reason);
        self.inner
            .peers
            .send_frame(peer_id, &ServerFrame::JoinRoomFailed { reason, room_id });
    }

    fn room_handle(&self, room_id: RoomId) -> Option<RoomHandle> {
        self.inner.rooms.get(&room_id).map(|entry| entry.value().clone())
    }

    async fn send_room_command(&self, room_id: RoomId, cmd: RoomCommand) {
        match self.room_handle(room_id) {
            Some(handle) => {
                handle.send(cmd).await;
            }
            None => debug!("Dropped command for unknown room {}", room_id),
        }
    }
}
