//! Active dine-in session model (read-only for admin clients)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveDineIn {
    #[serde(alias = "_id")]
    pub id: String,
    pub table_id: String,
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub guest_count: Option<u32>,
    #[serde(default)]
    pub order_ids: Vec<String>,
    #[serde(default)]
    pub opened_at: Option<DateTime<Utc>>,
}
