// admin-client/src/store/orders.rs
// Order list store - four status buckets, full reload on every change

use shared::message::{OrderStatusBroadcast, SocketMessage};
use shared::models::{AcceptOrder, ActiveDineIn, Order, OrderStatus, RejectOrder};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{RwLock, watch};

use super::{LoadingGuard, MutationResult, settle};
use crate::api::OrderApi;
use crate::session::SessionHandle;
use crate::socket::Broadcaster;
use crate::{ClientError, ClientResult};

/// Client-side order lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBuckets {
    pub pending: Vec<Order>,
    pub processing: Vec<Order>,
    pub completed: Vec<Order>,
    pub active_dine_in: Vec<ActiveDineIn>,
}

impl OrderBuckets {
    /// Bucket for a status; rejected orders are not kept
    pub fn bucket(&self, status: OrderStatus) -> &[Order] {
        match status {
            OrderStatus::Pending => self.pending.as_slice(),
            OrderStatus::Processing => self.processing.as_slice(),
            OrderStatus::Completed => self.completed.as_slice(),
            OrderStatus::Rejected => &[],
        }
    }

    fn bucket_mut(&mut self, status: OrderStatus) -> Option<&mut Vec<Order>> {
        match status {
            OrderStatus::Pending => Some(&mut self.pending),
            OrderStatus::Processing => Some(&mut self.processing),
            OrderStatus::Completed => Some(&mut self.completed),
            OrderStatus::Rejected => None,
        }
    }

    /// Locate an order and the bucket holding it
    pub fn find(&self, order_id: &str) -> Option<(OrderStatus, &Order)> {
        OrderStatus::BUCKETED.into_iter().find_map(|status| {
            self.bucket(status)
                .iter()
                .find(|o| o.id == order_id)
                .map(|o| (status, o))
        })
    }
}

/// Statuses whose fetch did not refresh their bucket
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadReport {
    pub failed: Vec<OrderStatus>,
    pub dine_in_failed: bool,
}

impl ReloadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && !self.dine_in_failed
    }
}

/// Holds the order buckets and performs staff transitions.
///
/// Bucket fetches are independent: one failing status leaves its bucket
/// untouched and the others still refresh.
pub struct OrderStore {
    api: Arc<dyn OrderApi>,
    broadcaster: Arc<dyn Broadcaster>,
    session: SessionHandle,
    buckets: RwLock<OrderBuckets>,
    loading: AtomicUsize,
    revision: watch::Sender<u64>,
}

impl std::fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStore")
            .field("loading", &self.is_loading())
            .field("revision", &self.revision())
            .finish()
    }
}

impl OrderStore {
    pub fn new(
        api: Arc<dyn OrderApi>,
        broadcaster: Arc<dyn Broadcaster>,
        session: SessionHandle,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            api,
            broadcaster,
            session,
            buckets: RwLock::new(OrderBuckets::default()),
            loading: AtomicUsize::new(0),
            revision,
        }
    }

    // ========== Reads ==========

    pub async fn snapshot(&self) -> OrderBuckets {
        self.buckets.read().await.clone()
    }

    pub async fn orders(&self, status: OrderStatus) -> Vec<Order> {
        self.buckets.read().await.bucket(status).to_vec()
    }

    pub async fn active_dine_in(&self) -> Vec<ActiveDineIn> {
        self.buckets.read().await.active_dine_in.clone()
    }

    /// True while any reload or mutation is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// Incremented after every reload
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    // ========== Reloads ==========

    /// Fetch pending, processing and completed orders, one request each
    pub async fn load_orders(&self) -> ClientResult<ReloadReport> {
        let restaurant_id = self.session.restaurant_id().await?;
        let _loading = LoadingGuard::enter(&self.loading);
        let mut report = ReloadReport::default();

        for status in OrderStatus::BUCKETED {
            let fetched = self.api.list_orders(&restaurant_id, status).await;
            match settle(status.as_str(), fetched) {
                Some(orders) => {
                    let mut buckets = self.buckets.write().await;
                    if let Some(bucket) = buckets.bucket_mut(status) {
                        *bucket = orders;
                    }
                }
                None => report.failed.push(status),
            }
        }

        tracing::debug!(
            restaurant_id = %restaurant_id,
            failed = ?report.failed,
            "Orders reloaded"
        );
        self.bump();
        Ok(report)
    }

    pub async fn load_active_dine_in(&self) -> ClientResult<bool> {
        let restaurant_id = self.session.restaurant_id().await?;
        let _loading = LoadingGuard::enter(&self.loading);

        let fetched = self.api.list_active_dine_in(&restaurant_id).await;
        let refreshed = match settle("active dine-in", fetched) {
            Some(sessions) => {
                self.buckets.write().await.active_dine_in = sessions;
                true
            }
            None => false,
        };
        self.bump();
        Ok(refreshed)
    }

    /// Orders followed by active dine-in
    pub async fn reload_all(&self) -> ClientResult<ReloadReport> {
        let mut report = self.load_orders().await?;
        report.dine_in_failed = !self.load_active_dine_in().await?;
        Ok(report)
    }

    /// Drop all local state (logout)
    pub async fn clear(&self) {
        *self.buckets.write().await = OrderBuckets::default();
        self.bump();
    }

    // ========== Mutations ==========
    //
    // One loading guard spans the write, the broadcast and the reload.

    /// pending -> processing, then broadcast and reload
    pub async fn accept_order(&self, order_id: &str, data: &AcceptOrder) -> MutationResult {
        let _loading = LoadingGuard::enter(&self.loading);
        let outcome = self.accept_inner(order_id, data).await;
        self.finish("accept", order_id, outcome).await
    }

    /// pending -> rejected, then broadcast and reload
    pub async fn reject_order(&self, order_id: &str, data: &RejectOrder) -> MutationResult {
        let _loading = LoadingGuard::enter(&self.loading);
        let outcome = self.reject_inner(order_id, data).await;
        self.finish("reject", order_id, outcome).await
    }

    /// processing -> completed, then reload
    pub async fn complete_order(&self, order_id: &str) -> MutationResult {
        let _loading = LoadingGuard::enter(&self.loading);
        let outcome = self.complete_inner(order_id).await;
        self.finish("complete", order_id, outcome).await
    }

    async fn accept_inner(&self, order_id: &str, data: &AcceptOrder) -> ClientResult<()> {
        let restaurant_id = self.session.restaurant_id().await?;
        self.check_transition(order_id, OrderStatus::Processing)
            .await?;

        self.api.accept_order(order_id, data).await?;
        self.announce(
            restaurant_id,
            order_id,
            OrderStatus::Processing,
            data.customer_id.clone(),
        )
        .await;
        Ok(())
    }

    async fn reject_inner(&self, order_id: &str, data: &RejectOrder) -> ClientResult<()> {
        let restaurant_id = self.session.restaurant_id().await?;
        self.check_transition(order_id, OrderStatus::Rejected).await?;

        self.api.reject_order(order_id, data).await?;
        self.announce(
            restaurant_id,
            order_id,
            OrderStatus::Rejected,
            data.customer_id.clone(),
        )
        .await;
        Ok(())
    }

    async fn complete_inner(&self, order_id: &str) -> ClientResult<()> {
        self.session.restaurant_id().await?;
        self.check_transition(order_id, OrderStatus::Completed)
            .await?;

        self.api.complete_order(order_id).await
    }

    /// Refuse only transitions that are illegal from a locally known status
    async fn check_transition(&self, order_id: &str, next: OrderStatus) -> ClientResult<()> {
        let buckets = self.buckets.read().await;
        match buckets.find(order_id) {
            Some((current, _)) if !current.can_transition_to(next) => {
                Err(ClientError::Validation(format!(
                    "order {} is {}, cannot become {}",
                    order_id, current, next
                )))
            }
            _ => Ok(()),
        }
    }

    async fn announce(
        &self,
        restaurant_id: String,
        order_id: &str,
        status: OrderStatus,
        customer_id: Option<String>,
    ) {
        let payload = OrderStatusBroadcast {
            order_id: order_id.to_string(),
            order_status: status,
            restaurant_id,
            customer_id,
        };
        let msg = match SocketMessage::order_status_broadcast(&payload) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!(order_id, "Failed to encode broadcast: {}", e);
                return;
            }
        };
        if let Err(e) = self.broadcaster.broadcast(msg).await {
            tracing::warn!(order_id, status = %status, "Broadcast failed: {}", e);
        }
    }

    /// Log, reload unconditionally, and convert the outcome
    async fn finish(
        &self,
        action: &'static str,
        order_id: &str,
        outcome: ClientResult<()>,
    ) -> MutationResult {
        match &outcome {
            Ok(()) => tracing::info!(order_id, action, "Order updated"),
            Err(e) => tracing::error!(order_id, action, "Order update failed: {}", e),
        }

        if let Err(e) = self.load_orders().await {
            tracing::warn!(order_id, action, "Reload after {} failed: {}", action, e);
        }

        MutationResult::from(outcome)
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}
