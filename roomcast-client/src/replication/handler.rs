use crate::client::ClientContext;
use crate::event::{ClientEvent, EventHandler};
use crate::replication::{EntityEvent, EntityWorld};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub type SharedWorld = Arc<Mutex<EntityWorld>>;

/// Runs every client event through an [`EntityWorld`] before passing it on
/// to the wrapped handler. Resulting entity events are published on the
/// channel returned by [`ReplicationHandler::new`].
pub struct ReplicationHandler<H> {
    world: SharedWorld,
    entity_tx: mpsc::UnboundedSender<EntityEvent>,
    inner: H,
}

impl<H: EventHandler> ReplicationHandler<H> {
    pub fn new(world: SharedWorld, inner: H) -> (Self, mpsc::UnboundedReceiver<EntityEvent>) {
        let (entity_tx, entity_rx) = mpsc::unbounded_channel();
        (
            Self {
                world,
                entity_tx,
                inner,
            },
            entity_rx,
        )
    }
}

#[async_trait]
impl<H: EventHandler> EventHandler for ReplicationHandler<H> {
    async fn on_event(&mut self, ctx: &ClientContext, event: ClientEvent) {
        {
            let mut world = self.world.lock().await;
            if let ClientEvent::Identified { .. } = event {
                world.attach(ctx.sender().clone());
            }
            for entity_event in world.apply(&event) {
                let _ = self.entity_tx.send(entity_event);
            }
        }

        self.inner.on_event(ctx, event).await;
    }
}
