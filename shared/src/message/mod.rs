//! Socket message types
//!
//! These types are shared between the backend socket endpoint and admin
//! clients. A frame is a named event plus an arbitrary JSON payload; the
//! event names are part of the backend contract and must not change.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod payload;
pub use payload::*;

/// Named socket events
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SocketEvent {
    /// client -> server: subscribe to one restaurant's room
    JoinRestaurantRoom,
    /// server -> client: room join acknowledgement
    JoinedRestaurantRoom,
    /// server -> client: a customer placed a new order
    OrderPlaced,
    /// server -> client: an order changed
    OrderUpdate,
    /// client -> server: broadcast after a staff accept/reject
    OrderAcceptedOrRejected,
    /// server -> client: a table called a waiter
    NewWaiterCall,
    /// server -> client: a waiter call changed status
    WaiterCallStatusUpdated,
    /// Anything this client does not know about
    Other(String),
}

impl SocketEvent {
    /// Wire name of the event
    pub fn as_str(&self) -> &str {
        match self {
            SocketEvent::JoinRestaurantRoom => "joinRestaurantRoom",
            SocketEvent::JoinedRestaurantRoom => "joined_restaurant_room",
            SocketEvent::OrderPlaced => "orderPlaced",
            SocketEvent::OrderUpdate => "orderUpdate",
            SocketEvent::OrderAcceptedOrRejected => "orderAcceptedOrRejected",
            SocketEvent::NewWaiterCall => "new_waiter_call",
            SocketEvent::WaiterCallStatusUpdated => "waiter_call_status_updated",
            SocketEvent::Other(name) => name,
        }
    }
}

impl From<&str> for SocketEvent {
    fn from(name: &str) -> Self {
        match name {
            "joinRestaurantRoom" => SocketEvent::JoinRestaurantRoom,
            "joined_restaurant_room" => SocketEvent::JoinedRestaurantRoom,
            "orderPlaced" => SocketEvent::OrderPlaced,
            "orderUpdate" => SocketEvent::OrderUpdate,
            "orderAcceptedOrRejected" => SocketEvent::OrderAcceptedOrRejected,
            "new_waiter_call" => SocketEvent::NewWaiterCall,
            "waiter_call_status_updated" => SocketEvent::WaiterCallStatusUpdated,
            other => SocketEvent::Other(other.to_string()),
        }
    }
}

impl From<String> for SocketEvent {
    fn from(name: String) -> Self {
        SocketEvent::from(name.as_str())
    }
}

impl From<SocketEvent> for String {
    fn from(event: SocketEvent) -> Self {
        event.as_str().to_string()
    }
}

impl fmt::Display for SocketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One socket frame: `{"event": "...", "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketMessage {
    pub event: SocketEvent,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl SocketMessage {
    pub fn new(event: SocketEvent, data: serde_json::Value) -> Self {
        Self { event, data }
    }

    /// Build a frame from any serializable payload
    pub fn with_payload<T: Serialize>(
        event: SocketEvent,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(event, serde_json::to_value(payload)?))
    }

    /// Room join announcement; the payload is the bare restaurant id
    pub fn join_room(restaurant_id: &str) -> Self {
        Self::new(
            SocketEvent::JoinRestaurantRoom,
            serde_json::Value::String(restaurant_id.to_string()),
        )
    }

    /// Accept/reject broadcast
    pub fn order_status_broadcast(
        payload: &OrderStatusBroadcast,
    ) -> Result<Self, serde_json::Error> {
        Self::with_payload(SocketEvent::OrderAcceptedOrRejected, payload)
    }

    /// Parse the payload as a specific type
    pub fn parse_data<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
