//! Socket listeners that keep the stores in step with the server
//!
//! Pushed payloads are never merged. Every relevant event triggers a full
//! authoritative reload of the affected store.

use shared::message::{SocketEvent, SocketMessage, WaiterCallStatusChange};
use std::sync::{Arc, Weak};

use crate::socket::{EventRegistry, ListenerGuard};
use crate::store::{OrderStore, WaiterCallStore};

/// Register the order listeners. Drop the guard to remove them.
pub fn mount_order_listeners(
    registry: &Arc<EventRegistry>,
    store: &Arc<OrderStore>,
) -> ListenerGuard {
    let mut ids = Vec::with_capacity(3);

    let weak = Arc::downgrade(store);
    ids.push(registry.on(SocketEvent::OrderUpdate, move |_msg| {
        let store = weak.clone();
        async move { reload_orders(store).await }
    }));

    ids.push(registry.on(SocketEvent::OrderPlaced, |msg: SocketMessage| async move {
        tracing::debug!(payload = %msg.data, "Order placed");
    }));

    ids.push(registry.on(
        SocketEvent::JoinedRestaurantRoom,
        |msg: SocketMessage| async move {
            tracing::debug!(payload = %msg.data, "Room join acknowledged");
        },
    ));

    ListenerGuard::new(registry, ids)
}

/// Register the waiter call listeners. Drop the guard to remove them.
pub fn mount_waiter_call_listeners(
    registry: &Arc<EventRegistry>,
    store: &Arc<WaiterCallStore>,
) -> ListenerGuard {
    let mut ids = Vec::with_capacity(2);

    for event in [SocketEvent::NewWaiterCall, SocketEvent::WaiterCallStatusUpdated] {
        let weak = Arc::downgrade(store);
        ids.push(registry.on(event, move |msg: SocketMessage| {
            let store = weak.clone();
            async move {
                if msg.event == SocketEvent::WaiterCallStatusUpdated
                    && let Ok(change) = msg.parse_data::<WaiterCallStatusChange>()
                {
                    tracing::debug!(call_id = %change.call_id, status = %change.status, "Waiter call status pushed");
                }
                reload_waiter_calls(store).await;
            }
        }));
    }

    ListenerGuard::new(registry, ids)
}

async fn reload_orders(store: Weak<OrderStore>) {
    let Some(store) = store.upgrade() else {
        return;
    };
    match store.reload_all().await {
        Ok(report) if !report.is_complete() => {
            tracing::warn!(failed = ?report.failed, dine_in_failed = report.dine_in_failed, "Partial order reload");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Order reload skipped: {}", e),
    }
}

async fn reload_waiter_calls(store: Weak<WaiterCallStore>) {
    let Some(store) = store.upgrade() else {
        return;
    };
    if let Err(e) = store.load_waiter_calls().await {
        tracing::warn!("Waiter call reload skipped: {}", e);
    }
}
