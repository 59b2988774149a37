//! Socket layer
//!
//! ```text
//! ConnectionManager ──▶ SocketConnection ──▶ Transport (TCP / Memory)
//!        │                     │
//!        └──── EventRegistry ◀─┘ (frames dispatched by event name)
//! ```

mod connection;
mod manager;
pub mod registry;
pub mod transport;

pub use connection::SocketConnection;
pub use manager::ConnectionManager;
pub use registry::{EventHandler, EventRegistry, ListenerGuard, ListenerId};
pub use transport::{
    Connector, MemoryConnector, MemoryTransport, TcpConnector, TcpTransport, Transport,
};

use async_trait::async_trait;
use shared::message::SocketMessage;

use crate::MessageError;

/// Connection lifecycle as observed by consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Reconnecting,
    /// Closed for good; a new connection must be opened
    Disconnected,
}

/// Sends client-originated events to other clients through the server
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, msg: SocketMessage) -> Result<(), MessageError>;
}
