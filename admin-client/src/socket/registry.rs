//! Event listener registry
//!
//! Maps socket event names to async callbacks. The registry is owned by the
//! [`ConnectionManager`](super::ConnectionManager) and outlives individual
//! connections, so listeners survive reconnects and connection replacement.

use futures::future::BoxFuture;
use shared::message::{SocketEvent, SocketMessage};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Boxed async event handler
pub type EventHandler = Arc<dyn Fn(SocketMessage) -> BoxFuture<'static, ()> + Send + Sync>;

/// Identifies one registration for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct EventRegistry {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<SocketEvent, Vec<(ListenerId, EventHandler)>>>,
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event`
    pub fn on<F, Fut>(&self, event: SocketEvent, handler: F) -> ListenerId
    where
        F: Fn(SocketMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handler: EventHandler = Arc::new(move |msg| Box::pin(handler(msg)));

        tracing::debug!(event = %event, "Listener registered");
        self.lock().entry(event).or_default().push((id, handler));
        id
    }

    /// Remove one registration. Returns false if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let mut removed = false;
        listeners.retain(|_, handlers| {
            let before = handlers.len();
            handlers.retain(|(lid, _)| *lid != id);
            removed |= handlers.len() != before;
            !handlers.is_empty()
        });
        removed
    }

    /// Number of handlers registered for `event`
    pub fn listener_count(&self, event: &SocketEvent) -> usize {
        self.lock().get(event).map_or(0, Vec::len)
    }

    /// Total number of registrations
    pub fn len(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every handler for the message's event, in registration order.
    /// Returns how many handlers ran.
    pub async fn dispatch(&self, msg: &SocketMessage) -> usize {
        let handlers: Vec<EventHandler> = self
            .lock()
            .get(&msg.event)
            .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();

        if handlers.is_empty() {
            tracing::trace!(event = %msg.event, "No listeners for event");
            return 0;
        }

        for handler in &handlers {
            handler(msg.clone()).await;
        }
        handlers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SocketEvent, Vec<(ListenerId, EventHandler)>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes its registrations when unmounted or dropped
#[derive(Debug)]
pub struct ListenerGuard {
    registry: Weak<EventRegistry>,
    ids: Vec<ListenerId>,
}

impl ListenerGuard {
    pub fn new(registry: &Arc<EventRegistry>, ids: Vec<ListenerId>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            ids,
        }
    }

    pub fn ids(&self) -> &[ListenerId] {
        &self.ids
    }

    /// Explicit teardown; same as dropping the guard
    pub fn unmount(self) {}
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            for id in self.ids.drain(..) {
                registry.off(id);
            }
            tracing::debug!("Listeners unmounted");
        }
    }
}
