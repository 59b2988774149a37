//! Waiter Call Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WaiterCallStatus {
    Pending,
    Acknowledged,
    Resolved,
}

impl WaiterCallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaiterCallStatus::Pending => "pending",
            WaiterCallStatus::Acknowledged => "acknowledged",
            WaiterCallStatus::Resolved => "resolved",
        }
    }

    /// A call can be acknowledged once, and resolved from either open state
    pub fn can_transition_to(&self, next: WaiterCallStatus) -> bool {
        matches!(
            (self, next),
            (WaiterCallStatus::Pending, WaiterCallStatus::Acknowledged)
                | (WaiterCallStatus::Pending, WaiterCallStatus::Resolved)
                | (WaiterCallStatus::Acknowledged, WaiterCallStatus::Resolved)
        )
    }
}

impl fmt::Display for WaiterCallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterCall {
    #[serde(alias = "_id")]
    pub id: String,
    pub table_id: String,
    #[serde(default)]
    pub table_name: Option<String>,
    pub status: WaiterCallStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Status update body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterCallStatusUpdate {
    pub status: WaiterCallStatus,
}
