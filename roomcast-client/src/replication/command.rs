use crate::replication::{EntityId, ReplicationError};
use std::fmt;
use std::str::{FromStr, SplitWhitespace};

pub const ADD: &str = "ADD";
pub const MOVE: &str = "MOVE";
pub const ROT: &str = "ROT";
pub const IMG: &str = "IMG";
pub const OPACITY: &str = "OPACITY";
pub const SCALE: &str = "SCALE";
pub const METHOD: &str = "METHOD";
pub const DESTROY: &str = "DESTROY";

/// One entry of an owner's mutation log, carried as a relayed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityCommand {
    /// `ADD typeId x y entityId param*`. The entity id travels as the first
    /// constructor parameter.
    Add {
        type_id: String,
        x: f64,
        y: f64,
        entity_id: EntityId,
        params: Vec<String>,
    },
    Move { entity_id: EntityId, x: f64, y: f64 },
    Rotate { entity_id: EntityId, angle: f64 },
    Image { entity_id: EntityId, url: String },
    Opacity { entity_id: EntityId, value: f64 },
    Scale { entity_id: EntityId, w: f64, h: f64 },
    Method {
        entity_id: EntityId,
        name: String,
        params: Vec<String>,
    },
    Destroy { entity_id: EntityId },
}

impl EntityCommand {
    pub fn parse(payload: &str) -> Result<Self, ReplicationError> {
        let mut args = Args(payload.split_whitespace());
        let verb = args.0.next().unwrap_or_default();

        let cmd = match verb {
            ADD => EntityCommand::Add {
                type_id: args.word(ADD)?.to_string(),
                x: args.number(ADD)?,
                y: args.number(ADD)?,
                entity_id: args.entity_id(ADD)?,
                params: args.rest(),
            },
            MOVE => EntityCommand::Move {
                entity_id: args.entity_id(MOVE)?,
                x: args.number(MOVE)?,
                y: args.number(MOVE)?,
            },
            ROT => EntityCommand::Rotate {
                entity_id: args.entity_id(ROT)?,
                angle: args.number(ROT)?,
            },
            IMG => EntityCommand::Image {
                entity_id: args.entity_id(IMG)?,
                url: args.word(IMG)?.to_string(),
            },
            OPACITY => EntityCommand::Opacity {
                entity_id: args.entity_id(OPACITY)?,
                value: args.number(OPACITY)?,
            },
            SCALE => EntityCommand::Scale {
                entity_id: args.entity_id(SCALE)?,
                w: args.number(SCALE)?,
                h: args.number(SCALE)?,
            },
            METHOD => EntityCommand::Method {
                entity_id: args.entity_id(METHOD)?,
                name: args.word(METHOD)?.to_string(),
                params: args.rest(),
            },
            DESTROY => EntityCommand::Destroy {
                entity_id: args.entity_id(DESTROY)?,
            },
            other => return Err(ReplicationError::UnknownVerb(other.to_string())),
        };

        Ok(cmd)
    }

    pub fn entity_id(&self) -> EntityId {
        match self {
            EntityCommand::Add { entity_id, .. }
            | EntityCommand::Move { entity_id, .. }
            | EntityCommand::Rotate { entity_id, .. }
            | EntityCommand::Image { entity_id, .. }
            | EntityCommand::Opacity { entity_id, .. }
            | EntityCommand::Scale { entity_id, .. }
            | EntityCommand::Method { entity_id, .. }
            | EntityCommand::Destroy { entity_id } => *entity_id,
        }
    }
}

/// Free-form values (type ids, urls, method names, params) must stay one
/// token on the wire.
pub fn check_token(value: &str) -> Result<(), ReplicationError> {
    if value.is_empty() || value.contains(char::is_whitespace) {
        return Err(ReplicationError::InvalidToken(value.to_string()));
    }
    Ok(())
}

struct Args<'a>(SplitWhitespace<'a>);

impl<'a> Args<'a> {
    fn word(&mut self, verb: &'static str) -> Result<&'a str, ReplicationError> {
        self.0
            .next()
            .ok_or(ReplicationError::MissingArgument { verb })
    }

    fn number(&mut self, verb: &'static str) -> Result<f64, ReplicationError> {
        let raw = self.word(verb)?;
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ReplicationError::InvalidNumber {
                verb,
                value: raw.to_string(),
            }),
        }
    }

    fn entity_id(&mut self, verb: &'static str) -> Result<EntityId, ReplicationError> {
        let raw = self.word(verb)?;
        raw.parse()
            .map_err(|_| ReplicationError::InvalidId(raw.to_string()))
    }

    fn rest(self) -> Vec<String> {
        self.0.map(str::to_string).collect()
    }
}

impl FromStr for EntityCommand {
    type Err = ReplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EntityCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityCommand::Add {
                type_id,
                x,
                y,
                entity_id,
                params,
            } => {
                write!(f, "{ADD} {type_id} {x} {y} {entity_id}")?;
                for param in params {
                    write!(f, " {param}")?;
                }
                Ok(())
            }
            EntityCommand::Move { entity_id, x, y } => write!(f, "{MOVE} {entity_id} {x} {y}"),
            EntityCommand::Rotate { entity_id, angle } => write!(f, "{ROT} {entity_id} {angle}"),
            EntityCommand::Image { entity_id, url } => write!(f, "{IMG} {entity_id} {url}"),
            EntityCommand::Opacity { entity_id, value } => {
                write!(f, "{OPACITY} {entity_id} {value}")
            }
            EntityCommand::Scale { entity_id, w, h } => write!(f, "{SCALE} {entity_id} {w} {h}"),
            EntityCommand::Method {
                entity_id,
                name,
                params,
            } => {
                write!(f, "{METHOD} {entity_id} {name}")?;
                for param in params {
                    write!(f, " {param}")?;
                }
                Ok(())
            }
            EntityCommand::Destroy { entity_id } => write!(f, "{DESTROY} {entity_id}"),
        }
    }
}
