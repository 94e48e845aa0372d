use crate::config::RelayConfig;
use crate::connection::handler::handle_connection;
use crate::registry::Relay;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// TCP front door of the relay: accepts connections and hands each one to
/// its own handler task.
pub struct RelayServer {
    listener: TcpListener,
    relay: Relay,
}

impl RelayServer {
    pub async fn bind(config: RelayConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind))?;

        Ok(Self {
            listener,
            relay: Relay::new(config),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    /// Accept loop. Runs until the task is dropped; a failed accept is
    /// logged and skipped.
    pub async fn run(self) -> Result<()> {
        info!("Relay listening on {}", self.local_addr()?);

        loop {
            let (stream, remote) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            if let Err(e) = stream.set_nodelay(true) {
                warn!("Failed to set TCP_NODELAY for {}: {}", remote, e);
            }

            tokio::spawn(handle_connection(stream, self.relay.clone()));
        }
    }

    /// Binds and runs the server in a background task, returning the bound
    /// address and a handle to the registry.
    pub async fn spawn(config: RelayConfig) -> Result<(SocketAddr, Relay)> {
        let server = Self::bind(config).await?;
        let addr = server.local_addr()?;
        let relay = server.relay.clone();

        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                warn!("Relay stopped: {:#}", e);
            }
        });

        Ok((addr, relay))
    }
}
