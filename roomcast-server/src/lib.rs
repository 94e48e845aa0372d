mod config;
mod connection;
mod registry;

pub use config::*;
pub use connection::*;
pub use registry::*;
