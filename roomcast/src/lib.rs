pub use roomcast_core::{
    ClientFrame, JoinFailure, PeerId, ProtocolError, RegistrySnapshot, RoomId, RoomInfo,
    ServerFrame,
};

pub mod protocol {
    pub use roomcast_core::protocol::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use roomcast_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use roomcast_client::*;
}
