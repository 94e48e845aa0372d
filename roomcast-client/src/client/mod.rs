mod connection;
mod context;
mod sender;
mod state;

pub use connection::*;
pub use context::*;
pub use sender::*;
pub use state::*;
