//! Owner-authoritative entities mirrored on every other peer.
//!
//! The owner's mutations are sent as plain payloads through the relay, so
//! the wire carries an ordered log that mirrors replay to converge.

mod command;
mod entity;
mod error;
mod handler;
mod registry;
mod world;

pub use command::*;
pub use entity::*;
pub use error::ReplicationError;
pub use handler::*;
pub use registry::*;
pub use world::*;
