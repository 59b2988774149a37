// admin-client/src/client.rs
// AdminSession - restaurant session, shared socket, stores and listeners

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};

use crate::api::{OrderApi, RestApi, RestaurantApi, WaiterCallApi};
use crate::http::NetworkHttpClient;
use crate::session::{RestaurantSession, SessionHandle};
use crate::socket::{ConnectionManager, ListenerGuard, SocketConnection};
use crate::store::{OrderStore, ReloadReport, WaiterCallStore};
use crate::sync::{mount_order_listeners, mount_waiter_call_listeners};
use crate::{ClientConfig, ClientError, ClientResult};

/// Revision watchers over the order and waiter call stores
#[derive(Debug)]
pub struct StoreChanges {
    orders: watch::Receiver<u64>,
    waiter_calls: watch::Receiver<u64>,
}

impl StoreChanges {
    /// Wait for the next reload of either store. False once a store is gone.
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            changed = self.orders.changed() => changed.is_ok(),
            changed = self.waiter_calls.changed() => changed.is_ok(),
        }
    }
}

/// Everything one signed-in staff client needs.
///
/// Loading the restaurant opens (or reuses) the shared connection and joins
/// the restaurant's room. Logout tears all of it down.
pub struct AdminSession {
    restaurant_api: Arc<dyn RestaurantApi>,
    session: SessionHandle,
    sockets: Arc<ConnectionManager>,
    orders: Arc<OrderStore>,
    waiter_calls: Arc<WaiterCallStore>,
    connection: Mutex<Option<Arc<SocketConnection>>>,
    listeners: Mutex<Vec<ListenerGuard>>,
    connect_timeout: Duration,
}

impl std::fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession")
            .field("sockets", &self.sockets)
            .field("orders", &self.orders)
            .field("waiter_calls", &self.waiter_calls)
            .finish()
    }
}

impl AdminSession {
    pub fn new<A>(api: Arc<A>, sockets: Arc<ConnectionManager>, connect_timeout: Duration) -> Self
    where
        A: OrderApi + WaiterCallApi + RestaurantApi + 'static,
    {
        let session = SessionHandle::new();
        let orders = Arc::new(OrderStore::new(
            api.clone(),
            sockets.clone(),
            session.clone(),
        ));
        let waiter_calls = Arc::new(WaiterCallStore::new(api.clone(), session.clone()));

        Self {
            restaurant_api: api,
            session,
            sockets,
            orders,
            waiter_calls,
            connection: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            connect_timeout,
        }
    }

    /// REST over HTTP and framed TCP sockets, as configured
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let http = NetworkHttpClient::new(config)?;
        let api = Arc::new(RestApi::new(http));
        let sockets = Arc::new(ConnectionManager::from_config(config));
        Ok(Self::new(api, sockets, config.request_timeout))
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn sockets(&self) -> &Arc<ConnectionManager> {
        &self.sockets
    }

    pub fn orders(&self) -> &Arc<OrderStore> {
        &self.orders
    }

    pub fn waiter_calls(&self) -> &Arc<WaiterCallStore> {
        &self.waiter_calls
    }

    /// Watch both stores for new revisions
    pub fn subscribe_changes(&self) -> StoreChanges {
        StoreChanges {
            orders: self.orders.subscribe(),
            waiter_calls: self.waiter_calls.subscribe(),
        }
    }

    /// Connection held by this session, if open
    pub async fn connection(&self) -> Option<Arc<SocketConnection>> {
        self.connection
            .lock()
            .await
            .clone()
            .filter(|c| !c.is_closed())
    }

    // ========== Restaurant ==========

    /// Fetch the signed-in restaurant and join its room.
    ///
    /// Socket failures are logged and leave the session usable over REST.
    pub async fn load_restaurant(&self) -> ClientResult<RestaurantSession> {
        let restaurant = self.restaurant_api.current_restaurant().await?;
        let loaded = RestaurantSession::from(restaurant);
        self.session.set(loaded.clone()).await;
        tracing::info!(
            restaurant_id = %loaded.restaurant_id,
            name = %loaded.name,
            "Restaurant loaded"
        );

        self.join_room(&loaded.restaurant_id).await;
        Ok(loaded)
    }

    /// Open <-> closed, remote first
    pub async fn toggle_status(&self) -> ClientResult<RestaurantSession> {
        let current = self.session.get().await.ok_or(ClientError::NoSession)?;
        let next = current.status.toggled();

        self.restaurant_api
            .update_restaurant_status(&current.restaurant_id, next)
            .await?;
        tracing::info!(restaurant_id = %current.restaurant_id, status = ?next, "Restaurant status changed");
        self.session.update(|s| s.status = next).await
    }

    pub async fn set_dine_in_available(&self, available: bool) -> ClientResult<RestaurantSession> {
        let restaurant_id = self.session.restaurant_id().await?;

        self.restaurant_api
            .set_dine_in_available(&restaurant_id, available)
            .await?;
        tracing::info!(restaurant_id = %restaurant_id, available, "Dine-in availability changed");
        self.session
            .update(|s| s.dine_in_available = available)
            .await
    }

    // ========== Listeners ==========

    /// Register order and waiter call listeners, replacing earlier ones
    pub async fn mount_listeners(&self) {
        let mut listeners = self.listeners.lock().await;
        listeners.clear();

        let registry = self.sockets.registry();
        listeners.push(mount_order_listeners(registry, &self.orders));
        listeners.push(mount_waiter_call_listeners(registry, &self.waiter_calls));
    }

    pub async fn unmount_listeners(&self) {
        self.listeners.lock().await.clear();
    }

    /// Reload orders, active dine-in and waiter calls
    pub async fn refresh(&self) -> ClientResult<ReloadReport> {
        let report = self.orders.reload_all().await?;
        if !self.waiter_calls.load_waiter_calls().await? {
            tracing::warn!("Waiter calls not refreshed");
        }
        Ok(report)
    }

    /// Unmount listeners, close the socket and forget the restaurant
    pub async fn logout(&self) {
        self.unmount_listeners().await;
        self.connection.lock().await.take();
        self.sockets.shutdown().await;

        self.session.clear().await;
        self.orders.clear().await;
        self.waiter_calls.clear().await;
        tracing::info!("Logged out");
    }

    async fn join_room(&self, restaurant_id: &str) {
        let connection = {
            let mut held = self.connection.lock().await;
            match held.as_ref().filter(|c| !c.is_closed()) {
                Some(connection) => connection.clone(),
                None => {
                    let connection = self.sockets.connect().await;
                    *held = Some(connection.clone());
                    connection
                }
            }
        };

        if let Err(e) = connection.wait_connected(self.connect_timeout).await {
            tracing::warn!(restaurant_id, "Room join skipped: {}", e);
            return;
        }
        if let Err(e) = connection.join_room(restaurant_id).await {
            tracing::warn!(restaurant_id, "Room join failed: {}", e);
        }
    }
}
