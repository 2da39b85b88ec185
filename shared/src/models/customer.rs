//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer entity (only the columns reporting needs)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub org_id: String,
    /// Branch where the customer was registered, if any
    pub branch_id: Option<i64>,
    /// Unix millis
    pub created_at: i64,
}
