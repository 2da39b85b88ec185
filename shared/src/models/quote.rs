//! Quote Model (presupuestos)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "quote_status", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
    /// Accepted and turned into an order / work order
    Converted,
}

impl QuoteStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted | Self::Converted)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Draft | Self::Sent)
    }
}

/// Quote entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Quote {
    pub id: i64,
    pub org_id: String,
    pub branch_id: i64,
    pub customer_id: Option<i64>,
    pub status: QuoteStatus,
    pub total: f64,
    /// Unix millis
    pub created_at: i64,
}
