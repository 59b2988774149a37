//! Admin Client - live order sync for restaurant staff tooling
//!
//! Fetches order lists over REST, keeps one socket connection joined to the
//! restaurant's room, and reloads the stores whenever the server pushes a
//! change.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod session;
pub mod socket;
pub mod store;
pub mod sync;

pub use api::{OrderApi, RestApi, RestaurantApi, WaiterCallApi};
pub use client::{AdminSession, StoreChanges};
pub use config::{ClientConfig, SocketConfig};
pub use error::{ClientError, ClientResult, ErrorKind, MessageError};
pub use http::{HttpClient, NetworkHttpClient};
pub use logger::init_logger;
pub use session::{RestaurantSession, SessionHandle};
pub use socket::{
    Broadcaster, ConnectionManager, ConnectionState, EventRegistry, ListenerGuard,
    SocketConnection,
};
pub use store::{MutationResult, OrderBuckets, OrderStore, ReloadReport, WaiterCallStore};
pub use sync::{mount_order_listeners, mount_waiter_call_listeners};

// Re-export shared types for convenience
pub use shared::message::{SocketEvent, SocketMessage};
pub use shared::models::{AcceptOrder, Order, OrderStatus, RejectOrder};
