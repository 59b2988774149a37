// admin-client/src/socket/manager.rs
// Session-wide owner of the shared socket connection

use async_trait::async_trait;
use shared::message::SocketMessage;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::Broadcaster;
use super::connection::SocketConnection;
use super::registry::EventRegistry;
use super::transport::{Connector, MemoryConnector, TcpConnector};
use crate::MessageError;
use crate::config::{ClientConfig, SocketConfig};

#[derive(Debug, Default)]
struct Slot {
    connection: Option<Arc<SocketConnection>>,
    leases: usize,
}

/// Owns at most one live [`SocketConnection`] and hands it to every
/// consumer that asks.
///
/// `connect()` takes a lease and `disconnect()` returns one; the connection
/// is torn down when the last lease goes. `shutdown()` tears it down
/// regardless (logout).
#[derive(Debug)]
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    config: SocketConfig,
    registry: Arc<EventRegistry>,
    slot: Mutex<Slot>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>, config: SocketConfig) -> Self {
        Self {
            connector,
            config,
            registry: Arc::new(EventRegistry::new()),
            slot: Mutex::new(Slot::default()),
        }
    }

    /// TCP manager for the configured socket address
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            Arc::new(TcpConnector::new(config.socket_addr.clone())),
            config.socket.clone(),
        )
    }

    /// In-process manager; the returned connector is the server's end
    pub fn in_memory(config: SocketConfig) -> (Self, MemoryConnector) {
        let connector = MemoryConnector::with_capacity(config.channel_capacity);
        (Self::new(Arc::new(connector.clone()), config), connector)
    }

    /// Listener registry shared by every connection this manager creates
    pub fn registry(&self) -> &Arc<EventRegistry> {
        &self.registry
    }

    /// Return the live connection, opening one if needed
    pub async fn connect(&self) -> Arc<SocketConnection> {
        let mut slot = self.slot.lock().await;

        if let Some(connection) = slot.connection.clone() {
            if !connection.is_closed() {
                slot.leases += 1;
                return connection;
            }
            tracing::debug!(connection_id = %connection.id(), "Replacing closed connection");
        }

        let connection =
            SocketConnection::open(self.connector.clone(), self.config.clone(), self.registry.clone());
        tracing::info!(
            connection_id = %connection.id(),
            endpoint = %self.connector.endpoint(),
            "Opening socket connection"
        );
        slot.connection = Some(connection.clone());
        slot.leases = 1;
        connection
    }

    /// Release one lease; closes the connection when none remain.
    /// No-op without a live connection.
    pub async fn disconnect(&self) {
        let released = {
            let mut slot = self.slot.lock().await;
            if slot.connection.is_none() {
                return;
            }

            slot.leases = slot.leases.saturating_sub(1);
            if slot.leases > 0 {
                tracing::debug!(leases = slot.leases, "Socket still in use");
                return;
            }
            slot.connection.take()
        };

        if let Some(connection) = released {
            connection.close().await;
        }
    }

    /// Close the connection regardless of outstanding leases
    pub async fn shutdown(&self) {
        let released = {
            let mut slot = self.slot.lock().await;
            slot.leases = 0;
            slot.connection.take()
        };

        if let Some(connection) = released {
            connection.close().await;
        }
    }

    /// Live connection, if any
    pub async fn current(&self) -> Option<Arc<SocketConnection>> {
        self.slot
            .lock()
            .await
            .connection
            .clone()
            .filter(|c| !c.is_closed())
    }

    pub async fn leases(&self) -> usize {
        self.slot.lock().await.leases
    }

    /// Join a restaurant room on the live connection
    pub async fn join_room(&self, restaurant_id: &str) -> Result<(), MessageError> {
        let connection = self.current().await.ok_or(MessageError::NotConnected)?;
        connection.join_room(restaurant_id).await
    }

    /// Send one frame on the live connection
    pub async fn emit(&self, msg: &SocketMessage) -> Result<(), MessageError> {
        let connection = self.current().await.ok_or(MessageError::NotConnected)?;
        connection.emit(msg).await
    }
}

#[async_trait]
impl Broadcaster for ConnectionManager {
    async fn broadcast(&self, msg: SocketMessage) -> Result<(), MessageError> {
        self.emit(&msg).await
    }
}
