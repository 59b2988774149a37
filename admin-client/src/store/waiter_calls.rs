use shared::models::{WaiterCall, WaiterCallStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{RwLock, watch};

use super::{LoadingGuard, MutationResult, settle};
use crate::api::WaiterCallApi;
use crate::session::SessionHandle;
use crate::{ClientError, ClientResult};

/// Waiter calls for the current restaurant
pub struct WaiterCallStore {
    api: Arc<dyn WaiterCallApi>,
    session: SessionHandle,
    calls: RwLock<Vec<WaiterCall>>,
    loading: AtomicUsize,
    revision: watch::Sender<u64>,
}

impl std::fmt::Debug for WaiterCallStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaiterCallStore")
            .field("loading", &self.is_loading())
            .field("revision", &self.revision())
            .finish()
    }
}

impl WaiterCallStore {
    pub fn new(api: Arc<dyn WaiterCallApi>, session: SessionHandle) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            api,
            session,
            calls: RwLock::new(Vec::new()),
            loading: AtomicUsize::new(0),
            revision,
        }
    }

    pub async fn calls(&self) -> Vec<WaiterCall> {
        self.calls.read().await.clone()
    }

    /// Calls still waiting for staff
    pub async fn open_calls(&self) -> Vec<WaiterCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.status != WaiterCallStatus::Resolved)
            .cloned()
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Full reload. Returns false when the previous list was kept.
    pub async fn load_waiter_calls(&self) -> ClientResult<bool> {
        let restaurant_id = self.session.restaurant_id().await?;
        let _loading = LoadingGuard::enter(&self.loading);

        let fetched = self.api.list_waiter_calls(&restaurant_id).await;
        let refreshed = match settle("waiter calls", fetched) {
            Some(calls) => {
                *self.calls.write().await = calls;
                true
            }
            None => false,
        };
        self.revision.send_modify(|r| *r += 1);
        Ok(refreshed)
    }

    pub async fn acknowledge(&self, call_id: &str) -> MutationResult {
        self.set_status(call_id, WaiterCallStatus::Acknowledged)
            .await
    }

    pub async fn resolve(&self, call_id: &str) -> MutationResult {
        self.set_status(call_id, WaiterCallStatus::Resolved).await
    }

    pub async fn clear(&self) {
        self.calls.write().await.clear();
        self.revision.send_modify(|r| *r += 1);
    }

    async fn set_status(&self, call_id: &str, status: WaiterCallStatus) -> MutationResult {
        let _loading = LoadingGuard::enter(&self.loading);
        let outcome = self.set_status_inner(call_id, status).await;
        match &outcome {
            Ok(()) => tracing::info!(call_id, status = %status, "Waiter call updated"),
            Err(e) => tracing::error!(call_id, status = %status, "Waiter call update failed: {}", e),
        }

        if let Err(e) = self.load_waiter_calls().await {
            tracing::warn!(call_id, "Reload after waiter call update failed: {}", e);
        }
        MutationResult::from(outcome)
    }

    async fn set_status_inner(&self, call_id: &str, status: WaiterCallStatus) -> ClientResult<()> {
        self.session.restaurant_id().await?;

        let current = self
            .calls
            .read()
            .await
            .iter()
            .find(|c| c.id == call_id)
            .map(|c| c.status);
        if let Some(current) = current
            && !current.can_transition_to(status)
        {
            return Err(ClientError::Validation(format!(
                "waiter call {} is {}, cannot become {}",
                call_id, current, status
            )));
        }

        self.api.update_waiter_call_status(call_id, status).await
    }
}
