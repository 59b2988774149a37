use async_trait::async_trait;
use serde_json::Value;
use shared::ListOutcome;
use shared::models::{
    AcceptOrder, ActiveDineIn, Order, OrderStatus, OrderStatusFilter, RejectOrder,
};

use super::{OrderApi, RestApi};
use crate::ClientResult;
use crate::http::HttpClient;

#[async_trait]
impl<H: HttpClient> OrderApi for RestApi<H> {
    async fn list_orders(
        &self,
        restaurant_id: &str,
        status: OrderStatus,
    ) -> ClientResult<ListOutcome<Order>> {
        // The backend filters on a PUT body rather than a query string
        let body: Value = self
            .http
            .put(
                &format!("orders/restaurant/{}/status", restaurant_id),
                &OrderStatusFilter { status },
            )
            .await?;
        Ok(ListOutcome::decode(&body, "orders"))
    }

    async fn accept_order(&self, order_id: &str, data: &AcceptOrder) -> ClientResult<()> {
        let _: Value = self
            .http
            .patch(&format!("orders/{}/accept", order_id), data)
            .await?;
        Ok(())
    }

    async fn reject_order(&self, order_id: &str, data: &RejectOrder) -> ClientResult<()> {
        let _: Value = self
            .http
            .patch(&format!("orders/{}/reject", order_id), data)
            .await?;
        Ok(())
    }

    async fn complete_order(&self, order_id: &str) -> ClientResult<()> {
        let _: Value = self
            .http
            .patch_empty(&format!("orders/{}/complete", order_id))
            .await?;
        Ok(())
    }

    async fn list_active_dine_in(
        &self,
        restaurant_id: &str,
    ) -> ClientResult<ListOutcome<ActiveDineIn>> {
        let body: Value = self
            .http
            .get(&format!("dine-in/restaurant/{}/active", restaurant_id))
            .await?;
        Ok(ListOutcome::decode(&body, "activeDineIns"))
    }
}
