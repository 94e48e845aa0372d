use bytes::Bytes;
use roomcast_core::{JoinFailure, PeerId, RoomInfo};
use tokio::sync::oneshot;

/// Requests handled by a room's actor, one at a time, in arrival order.
#[derive(Debug)]
pub enum RoomCommand {
    /// Admit a peer. Replies with the failure reason when refused.
    Join {
        peer_id: PeerId,
        reply: oneshot::Sender<Result<(), JoinFailure>>,
    },

    /// Drop a peer from the member set. Replies `false` if it was not a member.
    Leave {
        peer_id: PeerId,
        reply: oneshot::Sender<bool>,
    },

    Close,

    Open,

    /// Deliver an already encoded line to the current members.
    Cast {
        from: PeerId,
        line: Bytes,
        include_sender: bool,
    },

    Describe { reply: oneshot::Sender<RoomInfo> },

    /// Evict every member and stop the actor.
    Remove { reply: oneshot::Sender<()> },
}
