//! REST API adapters
//!
//! Each trait is the seam the stores depend on. `RestApi` implements all of
//! them over an [`HttpClient`]; tests substitute in-memory fakes.

mod orders;
mod restaurant;
mod waiter_calls;

use async_trait::async_trait;
use shared::ListOutcome;
use shared::models::{
    AcceptOrder, ActiveDineIn, Order, OrderStatus, RejectOrder, Restaurant, RestaurantStatus,
    WaiterCall, WaiterCallStatus,
};

use crate::ClientResult;
use crate::http::{HttpClient, NetworkHttpClient};

/// Order endpoints
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Status-filtered listing for one restaurant
    async fn list_orders(
        &self,
        restaurant_id: &str,
        status: OrderStatus,
    ) -> ClientResult<ListOutcome<Order>>;

    async fn accept_order(&self, order_id: &str, data: &AcceptOrder) -> ClientResult<()>;

    async fn reject_order(&self, order_id: &str, data: &RejectOrder) -> ClientResult<()>;

    async fn complete_order(&self, order_id: &str) -> ClientResult<()>;

    async fn list_active_dine_in(
        &self,
        restaurant_id: &str,
    ) -> ClientResult<ListOutcome<ActiveDineIn>>;
}

/// Waiter call endpoints
#[async_trait]
pub trait WaiterCallApi: Send + Sync {
    async fn list_waiter_calls(&self, restaurant_id: &str)
    -> ClientResult<ListOutcome<WaiterCall>>;

    async fn update_waiter_call_status(
        &self,
        call_id: &str,
        status: WaiterCallStatus,
    ) -> ClientResult<()>;
}

/// Restaurant endpoints
#[async_trait]
pub trait RestaurantApi: Send + Sync {
    /// Restaurant owned by the authenticated account
    async fn current_restaurant(&self) -> ClientResult<Restaurant>;

    async fn update_restaurant_status(
        &self,
        restaurant_id: &str,
        status: RestaurantStatus,
    ) -> ClientResult<()>;

    async fn set_dine_in_available(&self, restaurant_id: &str, available: bool)
    -> ClientResult<()>;
}

/// REST implementation of every API trait
#[derive(Debug, Clone)]
pub struct RestApi<H = NetworkHttpClient> {
    http: H,
}

impl<H: HttpClient> RestApi<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }
}
