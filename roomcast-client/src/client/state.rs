use serde::Serialize;

/// Lifecycle of one client connection. There is no way back from
/// `Disconnected` once identified; a new connection starts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Identified,
}
