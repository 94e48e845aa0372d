use crate::replication::EntityCommand;
use roomcast_core::PeerId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Globally unique entity id, generated by the owning peer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Replicated attributes of one entity, identical on the owner and on
/// every converged mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub id: EntityId,
    pub owner: PeerId,
    pub type_id: String,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub opacity: f64,
    pub scale: (f64, f64),
    pub image: Option<String>,
}

impl EntityState {
    pub const DEFAULT_ROTATION: f64 = 0.0;
    pub const DEFAULT_OPACITY: f64 = 1.0;
    pub const DEFAULT_SCALE: (f64, f64) = (1.0, 1.0);

    pub fn new(id: EntityId, owner: PeerId, type_id: &str, x: f64, y: f64) -> Self {
        Self {
            id,
            owner,
            type_id: type_id.to_string(),
            x,
            y,
            rotation: Self::DEFAULT_ROTATION,
            opacity: Self::DEFAULT_OPACITY,
            scale: Self::DEFAULT_SCALE,
            image: None,
        }
    }

    /// Applies an attribute mutation. Lifecycle commands (`ADD`, `METHOD`,
    /// `DESTROY`) leave the state untouched and return `false`.
    pub fn apply(&mut self, cmd: &EntityCommand) -> bool {
        match cmd {
            EntityCommand::Move { x, y, .. } => {
                self.x = *x;
                self.y = *y;
            }
            EntityCommand::Rotate { angle, .. } => self.rotation = *angle,
            EntityCommand::Image { url, .. } => self.image = Some(url.clone()),
            EntityCommand::Opacity { value, .. } => self.opacity = *value,
            EntityCommand::Scale { w, h, .. } => self.scale = (*w, *h),
            EntityCommand::Add { .. }
            | EntityCommand::Method { .. }
            | EntityCommand::Destroy { .. } => return false,
        }
        true
    }

    /// Commands that rebuild this state on a fresh mirror: `ADD` at the
    /// current position, then every attribute that differs from its default.
    pub fn replay(&self, params: &[String]) -> Vec<EntityCommand> {
        let entity_id = self.id;
        let mut cmds = vec![EntityCommand::Add {
            type_id: self.type_id.clone(),
            x: self.x,
            y: self.y,
            entity_id,
            params: params.to_vec(),
        }];

        if self.rotation != Self::DEFAULT_ROTATION {
            cmds.push(EntityCommand::Rotate {
                entity_id,
                angle: self.rotation,
            });
        }
        if let Some(url) = &self.image {
            cmds.push(EntityCommand::Image {
                entity_id,
                url: url.clone(),
            });
        }
        if self.opacity != Self::DEFAULT_OPACITY {
            cmds.push(EntityCommand::Opacity {
                entity_id,
                value: self.opacity,
            });
        }
        if self.scale != Self::DEFAULT_SCALE {
            cmds.push(EntityCommand::Scale {
                entity_id,
                w: self.scale.0,
                h: self.scale.1,
            });
        }
        cmds
    }
}
