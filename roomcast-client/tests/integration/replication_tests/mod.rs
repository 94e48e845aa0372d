mod test_ordered_entity_log;

use roomcast_client::RelayClient;
use roomcast_client::replication::{
    EntityEvent, EntityState, EntityWorld, Replica, ReplicationHandler, ReplicationScope,
    SharedWorld, TypeRegistry,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub struct Ship;

impl Replica for Ship {
    fn on_update(&mut self, state: &EntityState) {
        tracing::debug!("[Ship] {} at ({}, {})", state.id, state.x, state.y);
    }
}

pub fn ship_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register("Ship", |_state, _params| Ok(Ship));
    registry
}

/// A connected client with an attached entity world.
pub struct Player {
    pub client: RelayClient,
    pub world: SharedWorld,
    pub entities: mpsc::UnboundedReceiver<EntityEvent>,
}

pub async fn connect_player(addr: SocketAddr, scope: ReplicationScope) -> Player {
    let world = Arc::new(Mutex::new(EntityWorld::new(scope, ship_registry())));
    let (events_tx, _events_rx) = mpsc::unbounded_channel();
    let (handler, entities) = ReplicationHandler::new(world.clone(), events_tx);

    let client = RelayClient::connect(addr, handler)
        .await
        .expect("Failed to connect");

    // The world is attached by the handler once the Identified event runs.
    loop {
        if world.lock().await.peer_id().is_some() {
            break;
        }
        tokio::task::yield_now().await;
    }

    Player {
        client,
        world,
        entities,
    }
}
