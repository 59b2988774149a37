//! Transport abstraction for the socket channel
//!
//! ```text
//!         ┌────────────────────┐
//!         │   Transport Trait  │  ◄── pluggable
//!         └────────┬───────────┘
//!                  │
//!          ┌───────┴────────┐
//!          ▼                ▼
//!    TcpTransport     MemoryTransport
//!    (framed TCP)     (same process)
//! ```
//!
//! TCP frame layout: 4-byte little-endian payload length followed by the
//! JSON-encoded [`SocketMessage`].

use async_trait::async_trait;
use shared::message::SocketMessage;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{Mutex, broadcast};

use crate::MessageError;

/// Upper bound for a single frame
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Transport abstraction for socket communication
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn read_message(&self) -> Result<SocketMessage, MessageError>;
    async fn write_message(&self, msg: &SocketMessage) -> Result<(), MessageError>;
    async fn close(&self) -> Result<(), MessageError>;
}

/// Opens fresh transports; used for the initial connect and every reconnect
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug {
    async fn connect(&self) -> Result<Arc<dyn Transport>, MessageError>;

    /// Human-readable endpoint for logs
    fn endpoint(&self) -> String;
}

// ========== Frame helpers ==========

/// Read one frame from an async stream
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<SocketMessage, MessageError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(MessageError::Connection("Connection closed by peer".into()));
        }
        Err(e) => return Err(MessageError::Io(e)),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(MessageError::InvalidMessage(format!(
            "Frame too large: {} bytes",
            len
        )));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;

    SocketMessage::from_bytes(&payload)
        .map_err(|e| MessageError::InvalidMessage(format!("Undecodable frame: {}", e)))
}

/// Write one frame to an async stream
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    msg: &SocketMessage,
) -> Result<(), MessageError> {
    let payload = msg.to_bytes()?;
    let mut data = Vec::with_capacity(4 + payload.len());
    data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    data.extend_from_slice(&payload);

    writer.write_all(&data).await?;
    writer.flush().await?;
    Ok(())
}

// ========== TCP ==========

/// TCP Transport Implementation
#[derive(Debug, Clone)]
pub struct TcpTransport {
    reader: Arc<Mutex<OwnedReadHalf>>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl TcpTransport {
    pub async fn connect(addr: &str) -> Result<Self, MessageError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| MessageError::Connection(format!("TCP connect to {} failed: {}", addr, e)))?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: Arc::new(Mutex::new(reader)),
            writer: Arc::new(Mutex::new(writer)),
        })
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn read_message(&self) -> Result<SocketMessage, MessageError> {
        let mut reader = self.reader.lock().await;
        read_frame(&mut *reader).await
    }

    async fn write_message(&self, msg: &SocketMessage) -> Result<(), MessageError> {
        let mut writer = self.writer.lock().await;
        write_frame(&mut *writer, msg).await
    }

    /// Shuts the write half down unless a write is in flight; a stalled
    /// writer is released when its write times out and the halves drop.
    async fn close(&self) -> Result<(), MessageError> {
        match self.writer.try_lock() {
            Ok(mut writer) => writer.shutdown().await?,
            Err(_) => tracing::debug!("Write in flight, skipping TCP shutdown"),
        }
        Ok(())
    }
}

/// Connects a [`TcpTransport`] to a fixed address
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: String,
}

impl TcpConnector {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self) -> Result<Arc<dyn Transport>, MessageError> {
        let transport = TcpTransport::connect(&self.addr).await?;
        Ok(Arc::new(transport))
    }

    fn endpoint(&self) -> String {
        format!("tcp://{}", self.addr)
    }
}

// ========== Memory ==========

/// Memory Transport Implementation (for in-process communication)
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    /// Receiver for messages FROM server
    rx: Arc<Mutex<broadcast::Receiver<SocketMessage>>>,
    /// Sender for messages TO server
    tx: broadcast::Sender<SocketMessage>,
}

impl MemoryTransport {
    /// # Arguments
    /// * `server_tx` - the server's push channel (subscribed to here)
    /// * `client_tx` - the channel carrying messages TO the server
    pub fn new(
        server_tx: &broadcast::Sender<SocketMessage>,
        client_tx: &broadcast::Sender<SocketMessage>,
    ) -> Self {
        Self {
            rx: Arc::new(Mutex::new(server_tx.subscribe())),
            tx: client_tx.clone(),
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn read_message(&self) -> Result<SocketMessage, MessageError> {
        let mut rx = self.rx.lock().await;
        loop {
            match rx.recv().await {
                Ok(msg) => return Ok(msg),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Memory transport lagged, frames dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(MessageError::Connection("Memory channel closed".into()));
                }
            }
        }
    }

    async fn write_message(&self, msg: &SocketMessage) -> Result<(), MessageError> {
        self.tx
            .send(msg.clone())
            .map_err(|e| MessageError::Connection(format!("Failed to send to server: {}", e)))?;
        Ok(())
    }

    async fn close(&self) -> Result<(), MessageError> {
        Ok(())
    }
}

/// Hands out a new [`MemoryTransport`] on each connect
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    server_tx: broadcast::Sender<SocketMessage>,
    client_tx: broadcast::Sender<SocketMessage>,
}

impl MemoryConnector {
    pub fn new(
        server_tx: broadcast::Sender<SocketMessage>,
        client_tx: broadcast::Sender<SocketMessage>,
    ) -> Self {
        Self {
            server_tx,
            client_tx,
        }
    }

    /// Fresh pair of channels, each holding up to `capacity` frames
    pub fn with_capacity(capacity: usize) -> Self {
        let (server_tx, _) = broadcast::channel(capacity);
        let (client_tx, _) = broadcast::channel(capacity);
        Self::new(server_tx, client_tx)
    }

    /// Server side: push a frame to every connected client
    pub fn push(&self, msg: SocketMessage) -> usize {
        self.server_tx.send(msg).unwrap_or(0)
    }

    /// Server side: frames sent by clients
    pub fn outbound(&self) -> broadcast::Receiver<SocketMessage> {
        self.client_tx.subscribe()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn Transport>, MessageError> {
        Ok(Arc::new(MemoryTransport::new(&self.server_tx, &self.client_tx)))
    }

    fn endpoint(&self) -> String {
        "memory".to_string()
    }
}
