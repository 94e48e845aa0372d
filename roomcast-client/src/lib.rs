mod client;
mod error;
mod event;
mod mirror;
pub mod replication;

pub use client::*;
pub use error::ClientError;
pub use event::{ClientEvent, EventHandler};
pub use mirror::RegistryMirror;
