//! Work Order Model (lab jobs: lenses, frames, repairs)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "work_order_status", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderStatus {
    Pending,
    InProgress,
    InLab,
    Ready,
    Delivered,
    Cancelled,
}

impl WorkOrderStatus {
    /// Ready for pickup or already handed over
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Ready | Self::Delivered)
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress | Self::InLab)
    }
}

/// Work order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct WorkOrder {
    pub id: i64,
    pub org_id: String,
    pub branch_id: i64,
    pub customer_id: Option<i64>,
    pub status: WorkOrderStatus,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis, set when the job is handed to the customer
    pub delivered_at: Option<i64>,
}
