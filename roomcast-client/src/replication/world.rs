use crate::client::ClientSender;
use crate::event::ClientEvent;
use crate::replication::{
    EntityCommand, EntityId, EntityState, Replica, ReplicationError, TypeRegistry, check_token,
};
use crate::replication::command::{MOVE, OPACITY, ROT, SCALE};
use roomcast_core::{ClientFrame, PeerId, RoomId};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Where an owner's mutation log is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationScope {
    /// Every connected peer.
    Global,
    /// Members of one room.
    Room(RoomId),
}

/// What happened to a mirror as the result of one relayed event.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    Spawned {
        entity_id: EntityId,
        owner: PeerId,
        type_id: String,
    },
    /// Attribute change or method invocation, in owner order.
    Updated {
        entity_id: EntityId,
        command: EntityCommand,
    },
    Destroyed { entity_id: EntityId, owner: PeerId },
}

struct LocalRecord {
    state: EntityState,
    params: Vec<String>,
}

struct MirrorRecord {
    state: EntityState,
    replica: Box<dyn Replica>,
}

/// Entities this peer owns plus mirrors of everyone else's.
pub struct EntityWorld {
    sender: Option<ClientSender>,
    scope: ReplicationScope,
    registry: TypeRegistry,
    locals: HashMap<EntityId, LocalRecord>,
    mirrors: HashMap<EntityId, MirrorRecord>,
}

impl EntityWorld {
    pub fn new(scope: ReplicationScope, registry: TypeRegistry) -> Self {
        Self {
            sender: None,
            scope,
            registry,
            locals: HashMap::new(),
            mirrors: HashMap::new(),
        }
    }

    /// Binds the world to a live connection. Local entities can only be
    /// created once attached.
    pub fn attach(&mut self, sender: ClientSender) {
        self.sender = Some(sender);
    }

    pub fn peer_id(&self) -> Option<PeerId> {
        self.sender.as_ref().map(ClientSender::peer_id)
    }

    pub fn scope(&self) -> ReplicationScope {
        self.scope
    }

    /// Later mutations go to the new scope; existing mirrors elsewhere are
    /// not told.
    pub fn set_scope(&mut self, scope: ReplicationScope) {
        self.scope = scope;
    }

    pub fn spawn_local(
        &mut self,
        type_id: &str,
        x: f64,
        y: f64,
        params: Vec<String>,
    ) -> Result<EntityId, ReplicationError> {
        check_token(type_id)?;
        for param in &params {
            check_token(param)?;
        }
        finite(MOVE, x)?;
        finite(MOVE, y)?;

        let sender = self.sender.as_ref().ok_or(ReplicationError::Detached)?;
        let entity_id = EntityId::new();
        let state = EntityState::new(entity_id, sender.peer_id(), type_id, x, y);

        let cmd = EntityCommand::Add {
            type_id: type_id.to_string(),
            x,
            y,
            entity_id,
            params: params.clone(),
        };
        Outbox::new(sender, self.scope).emit(&cmd)?;

        debug!("Spawned local {} ({})", entity_id, type_id);
        self.locals
            .insert(entity_id, LocalRecord { state, params });
        Ok(entity_id)
    }

    pub fn local(&self, entity_id: &EntityId) -> Option<&EntityState> {
        self.locals.get(entity_id).map(|record| &record.state)
    }

    pub fn locals(&self) -> impl Iterator<Item = &EntityState> {
        self.locals.values().map(|record| &record.state)
    }

    /// Mutation surface of an owned entity. Mirrors have none.
    pub fn local_mut(&mut self, entity_id: &EntityId) -> Option<LocalEntity<'_>> {
        let sender = self.sender.as_ref()?;
        let outbox = Outbox::new(sender, self.scope);
        self.locals.get_mut(entity_id).map(|record| LocalEntity {
            state: &mut record.state,
            outbox,
        })
    }

    pub fn destroy_local(&mut self, entity_id: &EntityId) -> Result<(), ReplicationError> {
        let sender = self.sender.as_ref().ok_or(ReplicationError::Detached)?;
        if self.locals.remove(entity_id).is_none() {
            return Err(ReplicationError::UnknownEntity(*entity_id));
        }
        Outbox::new(sender, self.scope).emit(&EntityCommand::Destroy {
            entity_id: *entity_id,
        })
    }

    pub fn mirror(&self, entity_id: &EntityId) -> Option<&EntityState> {
        self.mirrors.get(entity_id).map(|record| &record.state)
    }

    pub fn mirrors(&self) -> impl Iterator<Item = &EntityState> {
        self.mirrors.values().map(|record| &record.state)
    }

    pub fn replica(&self, entity_id: &EntityId) -> Option<&dyn Replica> {
        self.mirrors
            .get(entity_id)
            .map(|record| record.replica.as_ref())
    }

    /// Feeds one client event through the replication layer. Payloads that
    /// are not entity commands, or that target unknown entities, are
    /// dropped.
    pub fn apply(&mut self, event: &ClientEvent) -> Vec<EntityEvent> {
        let me = self.peer_id();

        match event {
            ClientEvent::Message { from, payload } if Some(*from) != me => {
                self.apply_payload(*from, payload).into_iter().collect()
            }

            ClientEvent::PeerJoined { peer_id } if self.scope == ReplicationScope::Global => {
                self.replay_to(*peer_id);
                Vec::new()
            }

            ClientEvent::JoinedRoom { peer_id, room_id }
                if self.scope == ReplicationScope::Room(*room_id) =>
            {
                if Some(*peer_id) == me {
                    self.replay_to_scope();
                } else {
                    self.replay_to(*peer_id);
                }
                Vec::new()
            }

            ClientEvent::LeftRoom { peer_id, room_id }
                if self.scope == ReplicationScope::Room(*room_id) =>
            {
                if Some(*peer_id) == me {
                    self.drop_mirrors(|_| true)
                } else {
                    self.drop_mirrors(|owner| owner == *peer_id)
                }
            }

            ClientEvent::PeerLeft { peer_id } => self.drop_mirrors(|owner| owner == *peer_id),

            ClientEvent::Disconnected => self.drop_mirrors(|_| true),

            _ => Vec::new(),
        }
    }

    fn apply_payload(&mut self, from: PeerId, payload: &str) -> Option<EntityEvent> {
        let cmd = match EntityCommand::parse(payload) {
            Ok(cmd) => cmd,
            Err(e) => {
                debug!("Ignoring payload from {}: {}", from, e);
                return None;
            }
        };
        let entity_id = cmd.entity_id();

        if let EntityCommand::Add {
            type_id,
            x,
            y,
            params,
            ..
        } = &cmd
        {
            if self.mirrors.contains_key(&entity_id) || self.locals.contains_key(&entity_id) {
                debug!("Entity {} already known", entity_id);
                return None;
            }

            let state = EntityState::new(entity_id, from, type_id, *x, *y);
            let replica = match self.registry.construct(&state, params) {
                Ok(replica) => replica,
                Err(e) => {
                    debug!("Cannot mirror {} from {}: {}", entity_id, from, e);
                    return None;
                }
            };

            self.mirrors
                .insert(entity_id, MirrorRecord { state, replica });
            return Some(EntityEvent::Spawned {
                entity_id,
                owner: from,
                type_id: type_id.clone(),
            });
        }

        let Some(record) = self.mirrors.get_mut(&entity_id) else {
            debug!("Ignoring {} for unknown entity {}", payload, entity_id);
            return None;
        };
        if record.state.owner != from {
            debug!(
                "Ignoring {} from {}: entity owned by {}",
                payload, from, record.state.owner
            );
            return None;
        }

        match &cmd {
            EntityCommand::Destroy { .. } => {
                let mut record = self.mirrors.remove(&entity_id)?;
                record.replica.on_destroy();
                Some(EntityEvent::Destroyed {
                    entity_id,
                    owner: from,
                })
            }
            EntityCommand::Method { name, params, .. } => {
                record.replica.on_invoke(name, params);
                Some(EntityEvent::Updated {
                    entity_id,
                    command: cmd,
                })
            }
            _ => {
                record.state.apply(&cmd);
                record.replica.on_update(&record.state);
                Some(EntityEvent::Updated {
                    entity_id,
                    command: cmd,
                })
            }
        }
    }

    fn drop_mirrors(&mut self, owned_by: impl Fn(PeerId) -> bool) -> Vec<EntityEvent> {
        let doomed: Vec<EntityId> = self
            .mirrors
            .iter()
            .filter(|(_, record)| owned_by(record.state.owner))
            .map(|(id, _)| *id)
            .collect();

        doomed
            .into_iter()
            .filter_map(|entity_id| {
                let mut record = self.mirrors.remove(&entity_id)?;
                record.replica.on_destroy();
                Some(EntityEvent::Destroyed {
                    entity_id,
                    owner: record.state.owner,
                })
            })
            .collect()
    }

    /// Join-in-progress: rebuilds every local entity on one newcomer.
    fn replay_to(&self, peer_id: PeerId) {
        let Some(sender) = &self.sender else {
            return;
        };
        if peer_id == sender.peer_id() {
            return;
        }

        for record in self.locals.values() {
            for cmd in record.state.replay(&record.params) {
                let frame = ClientFrame::SendTo {
                    peer_id,
                    payload: cmd.to_string(),
                };
                if let Err(e) = sender.send(&frame) {
                    warn!("Failed to replay {} to {}: {}", record.state.id, peer_id, e);
                    return;
                }
            }
        }
    }

    /// Announces every local entity to the whole scope, after this peer
    /// entered a new room.
    fn replay_to_scope(&self) {
        let Some(sender) = &self.sender else {
            return;
        };
        let outbox = Outbox::new(sender, self.scope);

        for record in self.locals.values() {
            for cmd in record.state.replay(&record.params) {
                if let Err(e) = outbox.emit(&cmd) {
                    warn!("Failed to announce {}: {}", record.state.id, e);
                    return;
                }
            }
        }
    }
}

/// Handle on an owned entity. Each call updates the local state and sends
/// the matching command before returning.
pub struct LocalEntity<'a> {
    state: &'a mut EntityState,
    outbox: Outbox<'a>,
}

impl LocalEntity<'_> {
    pub fn id(&self) -> EntityId {
        self.state.id
    }

    pub fn state(&self) -> &EntityState {
        &*self.state
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> Result<(), ReplicationError> {
        finite(MOVE, x)?;
        finite(MOVE, y)?;
        self.mutate(EntityCommand::Move {
            entity_id: self.state.id,
            x,
            y,
        })
    }

    pub fn rotate(&mut self, angle: f64) -> Result<(), ReplicationError> {
        finite(ROT, angle)?;
        self.mutate(EntityCommand::Rotate {
            entity_id: self.state.id,
            angle,
        })
    }

    pub fn set_image(&mut self, url: &str) -> Result<(), ReplicationError> {
        check_token(url)?;
        self.mutate(EntityCommand::Image {
            entity_id: self.state.id,
            url: url.to_string(),
        })
    }

    pub fn set_opacity(&mut self, value: f64) -> Result<(), ReplicationError> {
        finite(OPACITY, value)?;
        self.mutate(EntityCommand::Opacity {
            entity_id: self.state.id,
            value,
        })
    }

    pub fn scale(&mut self, w: f64, h: f64) -> Result<(), ReplicationError> {
        finite(SCALE, w)?;
        finite(SCALE, h)?;
        self.mutate(EntityCommand::Scale {
            entity_id: self.state.id,
            w,
            h,
        })
    }

    /// Asks every mirror to run `name`. Nothing changes locally.
    pub fn invoke(&mut self, name: &str, params: Vec<String>) -> Result<(), ReplicationError> {
        check_token(name)?;
        for param in &params {
            check_token(param)?;
        }
        self.outbox.emit(&EntityCommand::Method {
            entity_id: self.state.id,
            name: name.to_string(),
            params,
        })
    }

    fn mutate(&mut self, cmd: EntityCommand) -> Result<(), ReplicationError> {
        self.state.apply(&cmd);
        self.outbox.emit(&cmd)
    }
}

#[derive(Clone, Copy)]
struct Outbox<'a> {
    sender: &'a ClientSender,
    scope: ReplicationScope,
}

impl<'a> Outbox<'a> {
    fn new(sender: &'a ClientSender, scope: ReplicationScope) -> Self {
        Self { sender, scope }
    }

    fn emit(&self, cmd: &EntityCommand) -> Result<(), ReplicationError> {
        let payload = cmd.to_string();
        let frame = match self.scope {
            ReplicationScope::Global => ClientFrame::Broadcast { payload },
            ReplicationScope::Room(room_id) => ClientFrame::SendToRoom { room_id, payload },
        };
        Ok(self.sender.send(&frame)?)
    }
}

fn finite(verb: &'static str, value: f64) -> Result<(), ReplicationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ReplicationError::InvalidNumber {
            verb,
            value: value.to_string(),
        })
    }
}
