use crate::client::{ClientContext, ClientSender, ConnectionState};
use crate::error::ClientError;
use crate::event::{ClientEvent, EventHandler};
use crate::mirror::RegistryMirror;
use bytes::Bytes;
use roomcast_core::protocol::token::decode_line;
use roomcast_core::{PeerId, RegistrySnapshot, ServerFrame};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::{RwLock, RwLockReadGuard, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One live connection to a relay.
///
/// `connect` returns only once the handshake has been read, so the mirror is
/// already seeded. From then on a single reader task applies each frame to
/// the mirror and then hands the matching event to the handler; a writer
/// task drains everything queued through [`ClientSender`].
pub struct RelayClient {
    ctx: ClientContext,
    mirror: Arc<RwLock<RegistryMirror>>,
    state: watch::Receiver<ConnectionState>,
    reader: JoinHandle<()>,
}

impl RelayClient {
    pub async fn connect<A, H>(addr: A, handler: H) -> Result<Self, ClientError>
    where
        A: ToSocketAddrs,
        H: EventHandler,
    {
        let (state_tx, state) = watch::channel(ConnectionState::Disconnected);
        state_tx.send_replace(ConnectionState::Connecting);

        let handshake = async {
            let stream = TcpStream::connect(addr).await?;
            let _ = stream.set_nodelay(true);
            let (reader, writer) = stream.into_split();
            let mut reader = BufReader::new(reader);
            let (peer_id, snapshot) = read_handshake(&mut reader).await?;
            Ok::<_, ClientError>((reader, writer, peer_id, snapshot))
        };
        let (mut reader, mut writer, peer_id, snapshot) = match handshake.await {
            Ok(connected) => connected,
            Err(e) => {
                state_tx.send_replace(ConnectionState::Disconnected);
                return Err(e);
            }
        };

        info!(
            "Identified as {} ({} peers, {} rooms)",
            peer_id,
            snapshot.peers.len(),
            snapshot.rooms.len()
        );
        let mirror = Arc::new(RwLock::new(RegistryMirror::from_snapshot(peer_id, snapshot)));

        let (tx, mut rx) = mpsc::unbounded_channel::<Bytes>();
        let sender = ClientSender::new(peer_id, tx);
        let ctx = ClientContext::new(mirror.clone(), sender);
        state_tx.send_replace(ConnectionState::Identified);

        let writer_task = tokio::spawn(async move {
            while let Some(line) = rx.recv().await {
                if let Err(e) = writer.write_all(&line).await {
                    debug!("Write failed: {}", e);
                    break;
                }
            }
            let _ = writer.shutdown().await;
        });

        let reader_task = tokio::spawn({
            let ctx = ctx.clone();
            let mirror = mirror.clone();
            let mut handler = handler;

            async move {
                handler
                    .on_event(&ctx, ClientEvent::Identified { peer_id })
                    .await;

                let mut buf = Vec::new();
                loop {
                    buf.clear();
                    match reader.read_until(b'\n', &mut buf).await {
                        Ok(0) => break,
                        Ok(_) => {}
                        Err(e) => {
                            debug!("Read failed: {}", e);
                            break;
                        }
                    }

                    let line = match decode_line(&buf) {
                        Ok(line) => line,
                        Err(lossy) => {
                            warn!("Skipping line that is not UTF-8: `{}`", lossy);
                            continue;
                        }
                    };
                    let frame = match ServerFrame::parse(line) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!("Skipping unreadable line `{}`: {}", line, e);
                            continue;
                        }
                    };

                    mirror.write().await.apply(&frame);

                    if let Some(event) = ClientEvent::from_frame(frame) {
                        handler.on_event(&ctx, event).await;
                    }
                }

                writer_task.abort();
                state_tx.send_replace(ConnectionState::Disconnected);
                info!("Connection to relay closed ({})", peer_id);
                handler.on_event(&ctx, ClientEvent::Disconnected).await;
            }
        });

        Ok(Self {
            ctx,
            mirror,
            state,
            reader: reader_task,
        })
    }

    pub fn peer_id(&self) -> PeerId {
        self.ctx.peer_id()
    }

    pub fn sender(&self) -> ClientSender {
        self.ctx.sender().clone()
    }

    pub fn context(&self) -> ClientContext {
        self.ctx.clone()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub async fn mirror(&self) -> RwLockReadGuard<'_, RegistryMirror> {
        self.mirror.read().await
    }

    /// Resolves once the stream has ended and the final event was handled.
    pub async fn closed(self) {
        let _ = self.reader.await;
    }
}

/// The handshake must be the very first line.
async fn read_handshake(
    reader: &mut BufReader<OwnedReadHalf>,
) -> Result<(PeerId, RegistrySnapshot), ClientError> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Err(ClientError::Handshake(
            "stream closed before handshake".to_string(),
        ));
    }
    let line = decode_line(&buf)
        .map_err(|lossy| ClientError::Handshake(format!("handshake is not UTF-8: `{lossy}`")))?;

    match ServerFrame::parse(line)? {
        ServerFrame::Handshake { peer_id, snapshot } => Ok((peer_id, snapshot)),
        other => Err(ClientError::Handshake(format!(
            "expected handshake, got `{other}`"
        ))),
    }
}
