use crate::client::ClientSender;
use crate::mirror::RegistryMirror;
use roomcast_core::PeerId;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};

/// Handed to every [`EventHandler`](crate::EventHandler) call: read access to
/// the registry mirror plus the connection's write path.
#[derive(Clone)]
pub struct ClientContext {
    mirror: Arc<RwLock<RegistryMirror>>,
    sender: ClientSender,
}

impl ClientContext {
    pub(crate) fn new(mirror: Arc<RwLock<RegistryMirror>>, sender: ClientSender) -> Self {
        Self { mirror, sender }
    }

    pub fn peer_id(&self) -> PeerId {
        self.sender.peer_id()
    }

    pub fn sender(&self) -> &ClientSender {
        &self.sender
    }

    pub async fn mirror(&self) -> RwLockReadGuard<'_, RegistryMirror> {
        self.mirror.read().await
    }
}
