//! Order Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status as reported by the backend
///
/// `cancelled` is accepted on the wire as a synonym for `rejected`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    #[serde(alias = "cancelled")]
    Rejected,
}

impl OrderStatus {
    /// Statuses that have a client-side bucket, in reload order
    pub const BUCKETED: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Rejected => "rejected",
        }
    }

    /// Whether staff may move an order from `self` to `next`
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Processing)
                | (OrderStatus::Pending, OrderStatus::Rejected)
                | (OrderStatus::Processing, OrderStatus::Completed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    /// Unit price in currency unit
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Total amount in currency unit
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Estimated minutes until ready, set on accept
    #[serde(default)]
    pub processing_time: Option<u32>,
    /// Set on reject
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Accept order payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptOrder {
    /// Estimated minutes until ready
    pub processing_time: u32,
    pub customer_id: Option<String>,
}

/// Reject order payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectOrder {
    pub reason: Option<String>,
    pub customer_id: Option<String>,
}

/// Status filter body for the order listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusFilter {
    pub status: OrderStatus,
}
