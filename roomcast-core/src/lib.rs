pub mod model;
pub mod protocol;

pub use model::{JoinFailure, PeerId, RegistrySnapshot, RoomId, RoomInfo};
pub use protocol::{ClientFrame, ProtocolError, ServerFrame};
