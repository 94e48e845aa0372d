mod watch;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use roomcast_server::{RelayConfig, RelayServer};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roomcast", about = "Room relay for peer-owned entity replication")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a relay server.
    Serve {
        /// JSON config file; flags below override its values.
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long)]
        bind: Option<SocketAddr>,

        #[arg(long)]
        max_rooms: Option<usize>,

        /// Deliver room-casts and broadcasts back to their sender.
        #[arg(long)]
        echo: bool,
    },
    /// Connect to a relay, print its events and send stdin lines as frames.
    Watch {
        #[arg(short, long, default_value = "127.0.0.1:7777")]
        addr: String,

        /// Print events as JSON, one per line.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Serve {
            config,
            bind,
            max_rooms,
            echo,
        } => {
            let mut config = match config {
                Some(path) => {
                    info!("Loading relay config from {}", path.display());
                    RelayConfig::from_json_file(&path)?
                }
                None => RelayConfig::default(),
            };
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(max_rooms) = max_rooms {
                config.max_rooms = max_rooms;
            }
            config.echo |= echo;

            let server = RelayServer::bind(config.clone()).await?;
            println!(
                "{} on {} (max {} rooms{})",
                "roomcast relay listening".green().bold(),
                server.local_addr()?.to_string().cyan(),
                config.max_rooms,
                if config.echo { ", echo" } else { "" }
            );
            server.run().await
        }
        Commands::Watch { addr, json } => watch::run(&addr, json).await,
    }
}
