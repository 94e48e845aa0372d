use crate::error::ClientError;
use crate::replication::EntityId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplicationError {
    #[error("`{0}` is not an entity command")]
    UnknownVerb(String),

    #[error("{verb}: missing argument")]
    MissingArgument { verb: &'static str },

    #[error("{verb}: `{value}` is not a valid number")]
    InvalidNumber { verb: &'static str, value: String },

    #[error("`{0}` is not a valid entity id")]
    InvalidId(String),

    #[error("`{0}` cannot be sent as a single token")]
    InvalidToken(String),

    #[error("no constructor registered for type `{0}`")]
    UnknownType(String),

    #[error("failed to construct `{type_id}`: {reason}")]
    Constructor { type_id: String, reason: String },

    #[error("not attached to a connection")]
    Detached,

    #[error("no local entity {0}")]
    UnknownEntity(EntityId),

    #[error(transparent)]
    Client(#[from] ClientError),
}
