use serde::{Deserialize, Serialize};

use crate::models::{OrderStatus, WaiterCallStatus};

// ==================== Client -> Server ====================

/// Sent after a staff member accepts or rejects an order so that other
/// staff clients in the same room refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusBroadcast {
    pub order_id: String,
    pub order_status: OrderStatus,
    pub restaurant_id: String,
    pub customer_id: Option<String>,
}

// ==================== Server -> Client ====================

/// Payload of `waiter_call_status_updated`. Only logged; the handler reloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterCallStatusChange {
    pub call_id: String,
    pub status: WaiterCallStatus,
}
