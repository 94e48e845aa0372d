use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::*;
use roomcast_client::{ClientContext, ClientEvent, EventHandler, RelayClient};
use roomcast_core::ClientFrame;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tracing::{debug, info};

struct Printer {
    json: bool,
    done: Option<oneshot::Sender<()>>,
}

#[async_trait]
impl EventHandler for Printer {
    async fn on_event(&mut self, _ctx: &ClientContext, event: ClientEvent) {
        if self.json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("{} {}", "failed to encode event:".red(), e),
            }
        } else {
            println!("{}", describe(&event));
        }

        if event == ClientEvent::Disconnected
            && let Some(done) = self.done.take()
        {
            let _ = done.send(());
        }
    }
}

fn describe(event: &ClientEvent) -> String {
    match event {
        ClientEvent::Identified { peer_id } => {
            format!("{} {}", "identified as".green().bold(), peer_id)
        }
        ClientEvent::PeerJoined { peer_id } => format!("{} {}", "+ peer".green(), peer_id),
        ClientEvent::PeerLeft { peer_id } => format!("{} {}", "- peer".yellow(), peer_id),
        ClientEvent::RoomAdded { room } => format!(
            "{} {} {} (capacity {})",
            "+ room".green(),
            room.id,
            room.name.bold(),
            room.capacity
        ),
        ClientEvent::AddRoomFailed { name, capacity } => {
            format!("{} {} {}", "add room failed:".red(), name, capacity)
        }
        ClientEvent::RoomRemoved { room_id } => format!("{} {}", "- room".yellow(), room_id),
        ClientEvent::JoinedRoom { peer_id, room_id } => {
            format!("{} {} -> {}", "joined".cyan(), peer_id, room_id)
        }
        ClientEvent::JoinRoomFailed { reason, room_id } => {
            format!("{} {} ({})", "join failed:".red(), room_id, reason)
        }
        ClientEvent::LeftRoom { peer_id, room_id } => {
            format!("{} {} <- {}", "left".cyan(), peer_id, room_id)
        }
        ClientEvent::RoomOwner { room_id, owner } => match owner {
            Some(owner) => format!("{} {} is {}", "owner of".cyan(), room_id, owner),
            None => format!("{} {} cleared", "owner of".cyan(), room_id),
        },
        ClientEvent::RoomClosed { room_id } => format!("{} {}", "closed".magenta(), room_id),
        ClientEvent::RoomOpened { room_id } => format!("{} {}", "opened".magenta(), room_id),
        ClientEvent::Message { from, payload } => {
            format!("{}: {}", from.to_string().dimmed(), payload)
        }
        ClientEvent::InvalidCommand { word, original } => {
            format!("{} {} ({})", "invalid:".red().bold(), original, word)
        }
        ClientEvent::Disconnected => "disconnected".red().bold().to_string(),
    }
}

pub async fn run(addr: &str, json: bool) -> Result<()> {
    let (done_tx, done_rx) = oneshot::channel();
    let client = RelayClient::connect(
        addr,
        Printer {
            json,
            done: Some(done_tx),
        },
    )
    .await
    .with_context(|| format!("Failed to connect to {addr}"))?;
    let sender = client.sender();
    info!("Watching relay at {} as {}", addr, client.peer_id());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let stdin_loop = async {
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match ClientFrame::parse(&line) {
                Ok(frame) => sender.send(&frame)?,
                Err(e) => eprintln!("{} {}", "not sent:".red(), e),
            }
        }
        // EOF on stdin ends the session.
        debug!("stdin closed, disconnecting");
        sender.disconnect()?;
        anyhow::Ok(())
    };

    tokio::select! {
        res = stdin_loop => res?,
        _ = done_rx => return Ok(()),
    }

    client.closed().await;
    Ok(())
}
