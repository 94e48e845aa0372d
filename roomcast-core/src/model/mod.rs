mod peer;
mod room;
mod snapshot;

pub use peer::PeerId;
pub use room::{JoinFailure, RoomId, RoomInfo};
pub use snapshot::RegistrySnapshot;
