//! Server network layer: WebSocket connections and round timer coordination

use crate::channel::{ChannelHandle, WsChannel};
use crate::engine::RoundEngine;
use crate::registry::PlayerRegistry;
use crate::router::MessageRouter;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Accepts WebSocket clients and runs the round timer alongside them
pub struct GameServer {
    listener: TcpListener,
    registry: Arc<PlayerRegistry>,
    engine: Arc<RoundEngine>,
    router: Arc<MessageRouter>,
    next_channel_id: AtomicU64,
}

impl GameServer {
    /// Binds the listener. The engine's registry is the one the server
    /// registers players into.
    pub async fn bind(addr: &str, engine: RoundEngine) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let registry = Arc::clone(engine.registry());
        let engine = Arc::new(engine);
        let router = Arc::new(MessageRouter::new(
            Arc::clone(&registry),
            Arc::clone(&engine),
        ));

        Ok(GameServer {
            listener,
            registry,
            engine,
            router,
            next_channel_id: AtomicU64::new(1),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn engine(&self) -> &Arc<RoundEngine> {
        &self.engine
    }

    /// Starts the round timer and serves connections until the task is dropped
    pub async fn run(self) {
        let timer = self.engine.spawn();

        info!("Server started successfully");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let channel_id = self.next_channel_id.fetch_add(1, Ordering::Relaxed);
                    let registry = Arc::clone(&self.registry);
                    let router = Arc::clone(&self.router);
                    tokio::spawn(handle_connection(stream, addr, channel_id, registry, router));
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }

            if timer.is_finished() {
                error!("Round timer stopped unexpectedly");
                break;
            }
        }
    }
}

/// Drives one client connection from handshake to disconnect
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    channel_id: u64,
    registry: Arc<PlayerRegistry>,
    router: Arc<MessageRouter>,
) {
    let socket = match tokio_tungstenite::accept_async(stream).await {
        Ok(socket) => socket,
        Err(e) => {
            warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };
    info!("Client {} connected from {}", channel_id, addr);

    let (mut sink, mut incoming) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let channel = Arc::new(WsChannel::new(channel_id, addr, tx));
    let handle: ChannelHandle = channel.clone();

    // Outbound frames are drained by their own task so a slow socket only
    // holds up this client.
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let closing = matches!(message, Message::Close(_));
            if let Err(e) = sink.send(message).await {
                warn!("Failed to write to client {}: {}", channel_id, e);
                break;
            }
            if closing {
                break;
            }
        }
    });

    while let Some(frame) = incoming.next().await {
        match frame {
            Ok(Message::Text(text)) => router.handle(&handle, &text).await,
            Ok(Message::Binary(_)) => {
                warn!("Ignoring binary frame from client {}", channel_id);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Connection error on client {}: {}", channel_id, e);
                break;
            }
        }
    }

    channel.mark_closed();
    registry.remove_channel(channel_id).await;
    writer.abort();
    info!("Client {} disconnected ({})", channel_id, channel.addr());
}
