use crate::registry::peer::PeerDirectory;
use crate::registry::room_command::RoomCommand;
use bytes::Bytes;
use roomcast_core::{JoinFailure, PeerId, RoomInfo, ServerFrame};
use std::ops::ControlFlow;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Cheap clonable address of a room actor.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    tx: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub(crate) fn new(tx: mpsc::Sender<RoomCommand>) -> Self {
        Self { tx }
    }

    /// Fire-and-forget. Returns `false` once the actor has stopped.
    pub async fn send(&self, cmd: RoomCommand) -> bool {
        self.tx.send(cmd).await.is_ok()
    }

    /// Sends a command carrying a reply channel and waits for the answer.
    /// `None` means the actor stopped before answering.
    pub async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Option<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if !self.send(build(reply_tx)).await {
            return None;
        }
        reply_rx.await.ok()
    }
}

/// Actor owning one room's membership, owner and closed flag. Every
/// operation on the room runs here, so they are serialized per room while
/// other rooms proceed independently.
pub struct Room {
    info: RoomInfo,
    command_rx: mpsc::Receiver<RoomCommand>,
    peers: PeerDirectory,
}

impl Room {
    pub fn new(
        info: RoomInfo,
        command_rx: mpsc::Receiver<RoomCommand>,
        peers: PeerDirectory,
    ) -> Self {
        Self {
            info,
            command_rx,
            peers,
        }
    }

    pub async fn run(mut self) {
        info!("Room {} ({}) event loop started", self.info.id, self.info.name);

        while let Some(cmd) = self.command_rx.recv().await {
            if self.handle_command(cmd).is_break() {
                break;
            }
        }

        info!("Room {} event loop finished", self.info.id);
    }

    fn handle_command(&mut self, cmd: RoomCommand) -> ControlFlow<()> {
        match cmd {
            RoomCommand::Join { peer_id, reply } => {
                let _ = reply.send(self.join(peer_id));
            }

            RoomCommand::Leave { peer_id, reply } => {
                let _ = reply.send(self.leave(peer_id));
            }

            RoomCommand::Close => self.set_closed(true),

            RoomCommand::Open => self.set_closed(false),

            RoomCommand::Cast {
                from,
                line,
                include_sender,
            } => self.cast(from, line, include_sender),

            RoomCommand::Describe { reply } => {
                let _ = reply.send(self.info.clone());
            }

            RoomCommand::Remove { reply } => {
                // Owner first, so ownership hands down member by member.
                while let Some(peer_id) = self
                    .info
                    .owner
                    .or_else(|| self.info.members.first().copied())
                {
                    if !self.leave(peer_id) {
                        break;
                    }
                }
                let _ = reply.send(());
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    fn join(&mut self, peer_id: PeerId) -> Result<(), JoinFailure> {
        let room_id = self.info.id;

        if self.info.members.contains(&peer_id) {
            return Ok(());
        }
        if self.info.closed {
            return Err(JoinFailure::Closed);
        }
        if self.info.is_full() {
            return Err(JoinFailure::Full);
        }
        // The peer may have disconnected while this request was queued.
        if !self.peers.set_room(peer_id, room_id) {
            return Err(JoinFailure::NoSuchRoom);
        }

        self.info.members.insert(peer_id);
        debug!(
            "Peer {} joined room {} ({}/{})",
            peer_id,
            room_id,
            self.info.members.len(),
            self.info.capacity
        );
        self.peers
            .broadcast(&ServerFrame::JoinedRoom { peer_id, room_id }, None);

        if self.info.owner.is_none() {
            self.info.owner = Some(peer_id);
            self.peers.broadcast(
                &ServerFrame::RoomOwner {
                    room_id,
                    owner: Some(peer_id),
                },
                None,
            );
        }

        Ok(())
    }

    fn leave(&mut self, peer_id: PeerId) -> bool {
        let room_id = self.info.id;

        if !self.info.members.remove(&peer_id) {
            return false;
        }

        self.peers.clear_room(peer_id, room_id);
        debug!("Peer {} left room {}", peer_id, room_id);
        self.peers
            .broadcast(&ServerFrame::LeftRoom { peer_id, room_id }, None);

        if self.info.owner == Some(peer_id) {
            self.info.owner = self.info.members.iter().next().copied();
            self.peers.broadcast(
                &ServerFrame::RoomOwner {
                    room_id,
                    owner: self.info.owner,
                },
                None,
            );
        }

        if self.info.members.is_empty() && self.info.closed {
            self.info.closed = false;
            self.peers.broadcast(&ServerFrame::RoomOpened(room_id), None);
        }

        true
    }

    fn set_closed(&mut self, closed: bool) {
        if self.info.closed == closed {
            return;
        }
        // An empty closed room would reopen at once.
        if closed && self.info.members.is_empty() {
            debug!("Ignoring close of empty room {}", self.info.id);
            return;
        }
        self.info.closed = closed;

        let frame = if closed {
            ServerFrame::RoomClosed(self.info.id)
        } else {
            ServerFrame::RoomOpened(self.info.id)
        };
        self.peers.broadcast(&frame, None);
    }

    fn cast(&self, from: PeerId, line: Bytes, include_sender: bool) {
        for member in &self.info.members {
            if *member != from || include_sender {
                self.peers.deliver(*member, line.clone());
            }
        }
    }
}
