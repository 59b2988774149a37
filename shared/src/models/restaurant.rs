//! Restaurant Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RestaurantStatus {
    Open,
    #[default]
    Closed,
}

impl RestaurantStatus {
    pub fn toggled(self) -> Self {
        match self {
            RestaurantStatus::Open => RestaurantStatus::Closed,
            RestaurantStatus::Closed => RestaurantStatus::Open,
        }
    }
}

/// Restaurant as returned by `restaurants/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: RestaurantStatus,
    #[serde(default)]
    pub dine_in_available: bool,
}

/// Status update body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantStatusUpdate {
    pub status: RestaurantStatus,
}

/// Dine-in availability update body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DineInAvailabilityUpdate {
    pub dine_in_available: bool,
}
