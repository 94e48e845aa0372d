mod peer;
mod relay;
mod room;
mod room_command;

pub use peer::*;
pub use relay::*;
pub use room::*;
pub use room_command::*;
