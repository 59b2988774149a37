// admin-client/src/socket/connection.rs
// One live socket connection with automatic reconnection

use shared::message::SocketMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::ConnectionState;
use super::registry::EventRegistry;
use super::transport::{Connector, Transport};
use crate::MessageError;
use crate::config::SocketConfig;

/// A persistent connection to the socket endpoint.
///
/// Created by [`SocketConnection::open`], which spawns a background task
/// that connects, reads frames into the [`EventRegistry`], and reconnects
/// after a fixed delay whenever the transport drops. Each instance has a
/// unique id; reconnects swap the transport but keep the instance.
///
/// The background task runs until [`close`](Self::close) is called or the
/// reconnect budget is exhausted.
#[derive(Debug)]
pub struct SocketConnection {
    id: Uuid,
    connector: Arc<dyn Connector>,
    config: SocketConfig,
    registry: Arc<EventRegistry>,
    transport: RwLock<Option<Arc<dyn Transport>>>,
    room: Mutex<Option<String>>,
    state_tx: watch::Sender<ConnectionState>,
    shutdown: CancellationToken,
}

impl SocketConnection {
    /// Create the connection and start its background task
    pub fn open(
        connector: Arc<dyn Connector>,
        config: SocketConfig,
        registry: Arc<EventRegistry>,
    ) -> Arc<Self> {
        let (state_tx, _) = watch::channel(ConnectionState::Connecting);
        let connection = Arc::new(Self {
            id: Uuid::new_v4(),
            connector,
            config,
            registry,
            transport: RwLock::new(None),
            room: Mutex::new(None),
            state_tx,
            shutdown: CancellationToken::new(),
        });

        tokio::spawn(connection.clone().run());
        connection
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// True once closed or once the background task has stopped for good
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled() || self.state() == ConnectionState::Disconnected
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Wait until connected, closed, or `timeout` elapses
    pub async fn wait_connected(&self, timeout: Duration) -> Result<(), MessageError> {
        let mut rx = self.state_tx.subscribe();
        let settled = tokio::time::timeout(
            timeout,
            rx.wait_for(|s| matches!(s, ConnectionState::Connected | ConnectionState::Disconnected)),
        )
        .await
        .map_err(|_| MessageError::Timeout(format!("not connected after {:?}", timeout)))?
        .map(|state| *state)
        .map_err(|_| MessageError::NotConnected)?;

        match settled {
            ConnectionState::Connected => Ok(()),
            _ => Err(MessageError::NotConnected),
        }
    }

    /// Room announced by the last successful join
    pub async fn room(&self) -> Option<String> {
        self.room.lock().await.clone()
    }

    /// Send one frame over the current transport
    pub async fn emit(&self, msg: &SocketMessage) -> Result<(), MessageError> {
        let transport = self
            .transport
            .read()
            .await
            .clone()
            .ok_or(MessageError::NotConnected)?;
        self.write(transport.as_ref(), msg).await
    }

    /// Announce interest in one restaurant's events.
    ///
    /// Fire-and-forget: no acknowledgement is awaited. The room is
    /// re-announced automatically after a transport reconnect.
    pub async fn join_room(&self, restaurant_id: &str) -> Result<(), MessageError> {
        if restaurant_id.trim().is_empty() {
            return Err(MessageError::InvalidMessage(
                "restaurant id must not be empty".into(),
            ));
        }

        self.emit(&SocketMessage::join_room(restaurant_id)).await?;
        *self.room.lock().await = Some(restaurant_id.to_string());
        tracing::info!(restaurant_id, "Joined restaurant room");
        Ok(())
    }

    /// Stop the background task and drop the transport. Idempotent.
    pub async fn close(&self) {
        if self.shutdown.is_cancelled() {
            return;
        }
        self.shutdown.cancel();

        let transport = self.transport.write().await.take();
        if let Some(transport) = transport
            && let Err(e) = transport.close().await
        {
            tracing::debug!("Transport close failed: {}", e);
        }
        self.state_tx.send_replace(ConnectionState::Disconnected);
        tracing::info!(connection_id = %self.id, "Socket disconnected");
    }

    async fn run(self: Arc<Self>) {
        let endpoint = self.connector.endpoint();
        let mut failures: u32 = 0;
        let mut first = true;

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }
            self.state_tx.send_replace(if first {
                ConnectionState::Connecting
            } else {
                ConnectionState::Reconnecting
            });
            first = false;

            let attempt = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = self.connector.connect() => result,
            };

            match attempt {
                Ok(transport) => {
                    failures = 0;
                    *self.transport.write().await = Some(transport.clone());
                    self.state_tx.send_replace(ConnectionState::Connected);
                    tracing::info!(connection_id = %self.id, endpoint = %endpoint, "Socket connected");

                    self.rejoin_room(transport.as_ref()).await;

                    let dropped = self.read_loop(transport.as_ref()).await;
                    self.transport.write().await.take();
                    let _ = transport.close().await;

                    match dropped {
                        Some(e) => tracing::warn!(endpoint = %endpoint, "Socket disconnected: {}", e),
                        None => break,
                    }
                }
                Err(e) => {
                    failures += 1;
                    tracing::error!(
                        endpoint = %endpoint,
                        attempt = failures,
                        "Socket connection error: {}",
                        e
                    );
                    if self.config.max_reconnect_attempts > 0
                        && failures >= self.config.max_reconnect_attempts
                    {
                        tracing::error!(
                            endpoint = %endpoint,
                            "Giving up after {} failed attempts",
                            failures
                        );
                        break;
                    }
                }
            }

            if !self.config.auto_reconnect {
                break;
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
        }

        self.state_tx.send_replace(ConnectionState::Disconnected);
        tracing::debug!(connection_id = %self.id, "Socket task finished");
    }

    /// Reads until the transport fails (returns the error) or shutdown (None)
    async fn read_loop(&self, transport: &dyn Transport) -> Option<MessageError> {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return None,
                result = transport.read_message() => match result {
                    Ok(msg) => {
                        tracing::trace!(event = %msg.event, "Socket frame received");
                        self.registry.dispatch(&msg).await;
                    }
                    Err(e) => return Some(e),
                },
            }
        }
    }

    async fn rejoin_room(&self, transport: &dyn Transport) {
        let Some(room) = self.room.lock().await.clone() else {
            return;
        };
        match self.write(transport, &SocketMessage::join_room(&room)).await {
            Ok(()) => tracing::info!(restaurant_id = %room, "Re-joined restaurant room"),
            Err(e) => tracing::warn!(restaurant_id = %room, "Room re-join failed: {}", e),
        }
    }

    /// Write one frame, bounded by the configured write timeout
    async fn write(&self, transport: &dyn Transport, msg: &SocketMessage) -> Result<(), MessageError> {
        let limit = self.config.write_timeout;
        tokio::time::timeout(limit, transport.write_message(msg))
            .await
            .map_err(|_| {
                tracing::warn!(connection_id = %self.id, event = %msg.event, "Socket write timed out");
                MessageError::Timeout(format!("frame not written within {:?}", limit))
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::transport::MemoryConnector;
    use shared::message::SocketEvent;
    use tokio::sync::broadcast;

    fn memory_connection() -> (
        Arc<SocketConnection>,
        broadcast::Sender<SocketMessage>,
        broadcast::Receiver<SocketMessage>,
    ) {
        let (server_tx, _) = broadcast::channel(16);
        let (client_tx, client_rx) = broadcast::channel(16);
        let connector = Arc::new(MemoryConnector::new(server_tx.clone(), client_tx));
        let connection = SocketConnection::open(
            connector,
            SocketConfig::default(),
            Arc::new(EventRegistry::new()),
        );
        (connection, server_tx, client_rx)
    }

    #[tokio::test]
    async fn test_join_room_sends_announcement() {
        let (connection, _server_tx, mut at_server) = memory_connection();
        connection
            .wait_connected(Duration::from_secs(1))
            .await
            .unwrap();

        connection.join_room("rest-7").await.unwrap();

        let msg = at_server.recv().await.unwrap();
        assert_eq!(msg.event, SocketEvent::JoinRestaurantRoom);
        assert_eq!(msg.data, serde_json::json!("rest-7"));
        assert_eq!(connection.room().await.as_deref(), Some("rest-7"));
    }

    #[tokio::test]
    async fn test_join_room_rejects_empty_id() {
        let (connection, _server_tx, _at_server) = memory_connection();
        connection
            .wait_connected(Duration::from_secs(1))
            .await
            .unwrap();

        let err = connection.join_room("  ").await.unwrap_err();
        assert!(matches!(err, MessageError::InvalidMessage(_)));
        assert!(connection.room().await.is_none());
    }

    #[tokio::test]
    async fn test_emit_after_close_fails() {
        let (connection, _server_tx, _at_server) = memory_connection();
        connection
            .wait_connected(Duration::from_secs(1))
            .await
            .unwrap();

        connection.close().await;
        connection.close().await;

        assert!(connection.is_closed());
        let err = connection
            .emit(&SocketMessage::join_room("rest-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, MessageError::NotConnected));
    }

    /// Transport whose writes never complete
    #[derive(Debug)]
    struct StalledTransport;

    #[async_trait::async_trait]
    impl Transport for StalledTransport {
        async fn read_message(&self) -> Result<SocketMessage, MessageError> {
            std::future::pending().await
        }

        async fn write_message(&self, _msg: &SocketMessage) -> Result<(), MessageError> {
            std::future::pending().await
        }

        async fn close(&self) -> Result<(), MessageError> {
            Ok(())
        }
    }

    #[derive(Debug)]
    struct StalledConnector;

    #[async_trait::async_trait]
    impl Connector for StalledConnector {
        async fn connect(&self) -> Result<Arc<dyn Transport>, MessageError> {
            Ok(Arc::new(StalledTransport))
        }

        fn endpoint(&self) -> String {
            "stalled".to_string()
        }
    }

    #[tokio::test]
    async fn test_emit_times_out_on_stalled_transport() {
        let connection = SocketConnection::open(
            Arc::new(StalledConnector),
            SocketConfig::default().with_write_timeout(Duration::from_millis(50)),
            Arc::new(EventRegistry::new()),
        );
        connection
            .wait_connected(Duration::from_secs(1))
            .await
            .unwrap();

        let err = connection.join_room("rest-1").await.unwrap_err();
        assert!(matches!(err, MessageError::Timeout(_)));
        assert!(connection.room().await.is_none());

        tokio::time::timeout(Duration::from_secs(1), connection.close())
            .await
            .unwrap();
        assert!(connection.is_closed());
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        // Nothing listens on port 1
        let connection = SocketConnection::open(
            Arc::new(crate::socket::TcpConnector::new("127.0.0.1:1")),
            SocketConfig::default()
                .with_reconnect_delay(Duration::from_millis(10))
                .with_max_reconnect_attempts(2),
            Arc::new(EventRegistry::new()),
        );

        let err = connection
            .wait_connected(Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, MessageError::NotConnected));
        assert!(connection.is_closed());
    }
}
