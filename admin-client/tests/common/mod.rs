// tests/common/mod.rs
#![allow(dead_code)]

use admin_client::api::{OrderApi, RestaurantApi, WaiterCallApi};
use admin_client::{ClientError, ClientResult};
use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::ListOutcome;
use shared::models::{
    AcceptOrder, ActiveDineIn, Order, OrderStatus, RejectOrder, Restaurant, RestaurantStatus,
    WaiterCall, WaiterCallStatus,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

pub const RESTAURANT_ID: &str = "rest-1";

/// Poll `check` every 10ms until it holds or `timeout` elapses
pub async fn eventually(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn order(id: &str, status: OrderStatus) -> Order {
    Order {
        id: id.to_string(),
        status,
        customer_id: Some(format!("cust-{}", id)),
        items: Vec::new(),
        total_amount: Decimal::new(1250, 2),
        created_at: None,
        updated_at: None,
        processing_time: None,
        rejection_reason: None,
    }
}

pub fn dine_in(id: &str, table_id: &str) -> ActiveDineIn {
    ActiveDineIn {
        id: id.to_string(),
        table_id: table_id.to_string(),
        table_name: None,
        customer_id: None,
        guest_count: Some(2),
        order_ids: Vec::new(),
        opened_at: None,
    }
}

pub fn waiter_call(id: &str, status: WaiterCallStatus) -> WaiterCall {
    WaiterCall {
        id: id.to_string(),
        table_id: "table-1".to_string(),
        table_name: None,
        status,
        message: None,
        created_at: None,
    }
}

#[derive(Debug, Default)]
struct BackendState {
    orders: Vec<Order>,
    dine_in: Vec<ActiveDineIn>,
    waiter_calls: Vec<WaiterCall>,
    restaurant_status: RestaurantStatus,
    dine_in_available: bool,
}

/// In-memory restaurant backend with per-status call counts and
/// failure injection
#[derive(Debug, Default)]
pub struct FakeBackend {
    state: Mutex<BackendState>,
    list_calls: Mutex<HashMap<OrderStatus, usize>>,
    dine_in_calls: Mutex<usize>,
    waiter_call_lists: Mutex<usize>,
    failing: Mutex<HashSet<OrderStatus>>,
    malformed: Mutex<HashSet<OrderStatus>>,
    fail_writes: Mutex<bool>,
    writes: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_orders(orders: Vec<Order>) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().orders = orders;
        backend
    }

    pub fn set_orders(&self, orders: Vec<Order>) {
        self.state.lock().unwrap().orders = orders;
    }

    pub fn push_order(&self, order: Order) {
        self.state.lock().unwrap().orders.push(order);
    }

    pub fn set_dine_in(&self, sessions: Vec<ActiveDineIn>) {
        self.state.lock().unwrap().dine_in = sessions;
    }

    pub fn set_waiter_calls(&self, calls: Vec<WaiterCall>) {
        self.state.lock().unwrap().waiter_calls = calls;
    }

    pub fn order_status(&self, id: &str) -> Option<OrderStatus> {
        self.state
            .lock()
            .unwrap()
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.status)
    }

    pub fn restaurant_status(&self) -> RestaurantStatus {
        self.state.lock().unwrap().restaurant_status
    }

    pub fn dine_in_available(&self) -> bool {
        self.state.lock().unwrap().dine_in_available
    }

    /// Listing requests made for `status`
    pub fn list_calls(&self, status: OrderStatus) -> usize {
        self.list_calls
            .lock()
            .unwrap()
            .get(&status)
            .copied()
            .unwrap_or(0)
    }

    pub fn dine_in_calls(&self) -> usize {
        *self.dine_in_calls.lock().unwrap()
    }

    pub fn waiter_call_lists(&self) -> usize {
        *self.waiter_call_lists.lock().unwrap()
    }

    pub fn fail_status(&self, status: OrderStatus) {
        self.failing.lock().unwrap().insert(status);
    }

    pub fn malformed_status(&self, status: OrderStatus) {
        self.malformed.lock().unwrap().insert(status);
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
        self.malformed.lock().unwrap().clear();
        *self.fail_writes.lock().unwrap() = false;
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    /// Write operations received, as "<action> <id>"
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    fn write(&self, action: &str, id: &str) -> ClientResult<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(ClientError::Api {
                code: 500,
                message: "write rejected".into(),
            });
        }
        self.writes.lock().unwrap().push(format!("{} {}", action, id));
        Ok(())
    }

    fn transition(
        &self,
        id: &str,
        from: OrderStatus,
        apply: impl FnOnce(&mut Order),
    ) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("order {}", id)))?;
        if order.status != from {
            return Err(ClientError::Api {
                code: 409,
                message: format!("order {} is {}", id, order.status),
            });
        }
        apply(order);
        Ok(())
    }
}

#[async_trait]
impl OrderApi for FakeBackend {
    async fn list_orders(
        &self,
        _restaurant_id: &str,
        status: OrderStatus,
    ) -> ClientResult<ListOutcome<Order>> {
        *self.list_calls.lock().unwrap().entry(status).or_default() += 1;

        if self.failing.lock().unwrap().contains(&status) {
            return Err(ClientError::Api {
                code: 503,
                message: format!("{} listing unavailable", status),
            });
        }
        if self.malformed.lock().unwrap().contains(&status) {
            return Ok(ListOutcome::Malformed("orders is not a list".into()));
        }

        let orders = self
            .state
            .lock()
            .unwrap()
            .orders
            .iter()
            .filter(|o| o.status == status)
            .cloned()
            .collect();
        Ok(ListOutcome::Ok(orders))
    }

    async fn accept_order(&self, order_id: &str, data: &AcceptOrder) -> ClientResult<()> {
        self.write("accept", order_id)?;
        self.transition(order_id, OrderStatus::Pending, |o| {
            o.status = OrderStatus::Processing;
            o.processing_time = Some(data.processing_time);
        })
    }

    async fn reject_order(&self, order_id: &str, data: &RejectOrder) -> ClientResult<()> {
        self.write("reject", order_id)?;
        self.transition(order_id, OrderStatus::Pending, |o| {
            o.status = OrderStatus::Rejected;
            o.rejection_reason = data.reason.clone();
        })
    }

    async fn complete_order(&self, order_id: &str) -> ClientResult<()> {
        self.write("complete", order_id)?;
        self.transition(order_id, OrderStatus::Processing, |o| {
            o.status = OrderStatus::Completed;
        })
    }

    async fn list_active_dine_in(
        &self,
        _restaurant_id: &str,
    ) -> ClientResult<ListOutcome<ActiveDineIn>> {
        *self.dine_in_calls.lock().unwrap() += 1;
        Ok(ListOutcome::Ok(self.state.lock().unwrap().dine_in.clone()))
    }
}

#[async_trait]
impl WaiterCallApi for FakeBackend {
    async fn list_waiter_calls(
        &self,
        _restaurant_id: &str,
    ) -> ClientResult<ListOutcome<WaiterCall>> {
        *self.waiter_call_lists.lock().unwrap() += 1;
        Ok(ListOutcome::Ok(self.state.lock().unwrap().waiter_calls.clone()))
    }

    async fn update_waiter_call_status(
        &self,
        call_id: &str,
        status: WaiterCallStatus,
    ) -> ClientResult<()> {
        self.write("waiter-call", call_id)?;
        let mut state = self.state.lock().unwrap();
        let call = state
            .waiter_calls
            .iter_mut()
            .find(|c| c.id == call_id)
            .ok_or_else(|| ClientError::NotFound(format!("waiter call {}", call_id)))?;
        call.status = status;
        Ok(())
    }
}

#[async_trait]
impl RestaurantApi for FakeBackend {
    async fn current_restaurant(&self) -> ClientResult<Restaurant> {
        let state = self.state.lock().unwrap();
        Ok(Restaurant {
            id: RESTAURANT_ID.to_string(),
            name: "Noodle Bar".to_string(),
            status: state.restaurant_status,
            dine_in_available: state.dine_in_available,
        })
    }

    async fn update_restaurant_status(
        &self,
        _restaurant_id: &str,
        status: RestaurantStatus,
    ) -> ClientResult<()> {
        self.write("restaurant-status", RESTAURANT_ID)?;
        self.state.lock().unwrap().restaurant_status = status;
        Ok(())
    }

    async fn set_dine_in_available(&self, _restaurant_id: &str, available: bool) -> ClientResult<()> {
        self.write("dine-in", RESTAURANT_ID)?;
        self.state.lock().unwrap().dine_in_available = available;
        Ok(())
    }
}
