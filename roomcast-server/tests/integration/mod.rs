pub mod connection_tests;
pub mod room_tests;

use roomcast_server::{Relay, RelayConfig, RelayServer};
use std::net::SocketAddr;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn start_test_relay(max_rooms: usize) -> (SocketAddr, Relay) {
    start_relay_with(RelayConfig {
        bind: SocketAddr::from(([127, 0, 0, 1], 0)),
        max_rooms,
        echo: false,
    })
    .await
}

pub async fn start_relay_with(config: RelayConfig) -> (SocketAddr, Relay) {
    RelayServer::spawn(config)
        .await
        .expect("Failed to start relay")
}
