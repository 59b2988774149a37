use async_trait::async_trait;
use serde_json::Value;
use shared::ListOutcome;
use shared::models::{WaiterCall, WaiterCallStatus, WaiterCallStatusUpdate};

use super::{RestApi, WaiterCallApi};
use crate::ClientResult;
use crate::http::HttpClient;

#[async_trait]
impl<H: HttpClient> WaiterCallApi for RestApi<H> {
    async fn list_waiter_calls(
        &self,
        restaurant_id: &str,
    ) -> ClientResult<ListOutcome<WaiterCall>> {
        let body: Value = self
            .http
            .get(&format!("waiter-calls/restaurant/{}", restaurant_id))
            .await?;
        Ok(ListOutcome::decode(&body, "waiterCalls"))
    }

    async fn update_waiter_call_status(
        &self,
        call_id: &str,
        status: WaiterCallStatus,
    ) -> ClientResult<()> {
        let _: Value = self
            .http
            .patch(
                &format!("waiter-calls/{}/status", call_id),
                &WaiterCallStatusUpdate { status },
            )
            .await?;
        Ok(())
    }
}
