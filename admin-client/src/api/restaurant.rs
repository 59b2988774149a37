use async_trait::async_trait;
use serde_json::Value;
use shared::models::{
    DineInAvailabilityUpdate, Restaurant, RestaurantStatus, RestaurantStatusUpdate,
};
use shared::response::decode_object;

use super::{RestApi, RestaurantApi};
use crate::http::HttpClient;
use crate::{ClientError, ClientResult};

#[async_trait]
impl<H: HttpClient> RestaurantApi for RestApi<H> {
    async fn current_restaurant(&self) -> ClientResult<Restaurant> {
        let body: Value = self.http.get("restaurants/me").await?;
        decode_object(&body, "restaurant")?
            .ok_or_else(|| ClientError::InvalidResponse("Missing restaurant data".into()))
    }

    async fn update_restaurant_status(
        &self,
        restaurant_id: &str,
        status: RestaurantStatus,
    ) -> ClientResult<()> {
        let _: Value = self
            .http
            .patch(
                &format!("restaurants/{}/status", restaurant_id),
                &RestaurantStatusUpdate { status },
            )
            .await?;
        Ok(())
    }

    async fn set_dine_in_available(
        &self,
        restaurant_id: &str,
        available: bool,
    ) -> ClientResult<()> {
        let _: Value = self
            .http
            .patch(
                &format!("restaurants/{}/dine-in", restaurant_id),
                &DineInAvailabilityUpdate {
                    dine_in_available: available,
                },
            )
            .await?;
        Ok(())
    }
}
