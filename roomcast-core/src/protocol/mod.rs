mod client_frame;
mod error;
mod server_frame;
pub mod token;
pub mod verb;

pub use client_frame::ClientFrame;
pub use error::ProtocolError;
pub use server_frame::ServerFrame;
