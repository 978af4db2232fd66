//! Client channels: the text endpoints the router and round engine write to
//!
//! A channel is anything that can take an outbound text frame for one
//! connected client. Sends never block the caller: `WsChannel` pushes onto a
//! per-connection queue drained by that connection's writer task, so a slow
//! socket only delays its own frames.

use crate::error::ChannelError;
use log::{error, warn};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// A bidirectional text endpoint representing one connected client
pub trait Channel: Send + Sync {
    /// Server-unique identifier, used for logging and disconnect cleanup
    fn id(&self) -> u64;

    fn send_text(&self, text: &str) -> Result<(), ChannelError>;

    fn is_open(&self) -> bool;

    fn close(&self) -> Result<(), ChannelError>;
}

pub type ChannelHandle = Arc<dyn Channel>;

/// Reports an error on `channel` as an `ERROR: ` frame.
///
/// If the frame cannot be delivered the channel is closed; a failure to
/// close is logged and swallowed.
pub fn send_error(channel: &dyn Channel, message: &str) {
    if let Err(e) = channel.send_text(&shared::error_frame(message)) {
        warn!("Failed to send error to channel {}: {}", channel.id(), e);
        if channel.is_open() {
            if let Err(close_err) = channel.close() {
                error!("Failed to close channel {}: {}", channel.id(), close_err);
            }
        }
    }
}

/// Channel backed by a WebSocket connection's outbound queue
#[derive(Debug)]
pub struct WsChannel {
    id: u64,
    addr: SocketAddr,
    sender: mpsc::UnboundedSender<Message>,
    open: AtomicBool,
}

impl WsChannel {
    pub fn new(id: u64, addr: SocketAddr, sender: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id,
            addr,
            sender,
            open: AtomicBool::new(true),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Marks the channel closed once the connection has gone away
    pub fn mark_closed(&self) {
        self.open.store(false, Ordering::Release);
    }
}

impl Channel for WsChannel {
    fn id(&self) -> u64 {
        self.id
    }

    fn send_text(&self, text: &str) -> Result<(), ChannelError> {
        if !self.is_open() {
            return Err(ChannelError::Closed(self.id));
        }
        self.sender
            .send(Message::Text(text.into()))
            .map_err(|e| ChannelError::Transport {
                id: self.id,
                reason: e.to_string(),
            })
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire) && !self.sender.is_closed()
    }

    fn close(&self) -> Result<(), ChannelError> {
        self.mark_closed();
        self.sender
            .send(Message::Close(None))
            .map_err(|_| ChannelError::Closed(self.id))
    }
}

/// In-process channel that records every frame it is asked to send.
///
/// Sends and closes can be made to fail, which is how the transport error
/// paths are driven without a socket.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    id: u64,
    closed: AtomicBool,
    fail_sends: AtomicBool,
    fail_close: AtomicBool,
    send_attempts: AtomicUsize,
    close_calls: AtomicUsize,
    sent: Mutex<Vec<String>>,
}

impl MemoryChannel {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn handle(id: u64) -> Arc<Self> {
        Arc::new(Self::new(id))
    }

    pub fn set_open(&self, open: bool) {
        self.closed.store(!open, Ordering::Release);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::Release);
    }

    pub fn fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::Release);
    }

    /// Frames delivered so far, in send order
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::Acquire)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::Acquire)
    }
}

impl Channel for MemoryChannel {
    fn id(&self) -> u64 {
        self.id
    }

    fn send_text(&self, text: &str) -> Result<(), ChannelError> {
        self.send_attempts.fetch_add(1, Ordering::AcqRel);
        if self.fail_sends.load(Ordering::Acquire) {
            return Err(ChannelError::Transport {
                id: self.id,
                reason: "simulated write failure".to_string(),
            });
        }
        if !self.is_open() {
            return Err(ChannelError::Closed(self.id));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    fn close(&self) -> Result<(), ChannelError> {
        self.close_calls.fetch_add(1, Ordering::AcqRel);
        if self.fail_close.load(Ordering::Acquire) {
            return Err(ChannelError::Transport {
                id: self.id,
                reason: "simulated close failure".to_string(),
            });
        }
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
