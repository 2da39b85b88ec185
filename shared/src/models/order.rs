//! Order Model (POS sales)

use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "order_status", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    Refunded,
}

/// Payment state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "payment_status", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
    Refunded,
}

/// Payment method recorded at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "payment_method", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Financing,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Transfer => "transfer",
            Self::Financing => "financing",
            Self::Other => "other",
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub org_id: String,
    pub branch_id: i64,
    pub customer_id: Option<i64>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    /// Order total, tax and discounts included
    pub total: f64,
    /// Unix millis
    pub created_at: i64,
}

impl Order {
    /// Paid and not reversed: the orders that count as revenue.
    pub fn is_revenue(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
            && !matches!(self.status, OrderStatus::Cancelled | OrderStatus::Refunded)
    }

    /// Still waiting for (part of) its payment.
    pub fn is_payment_pending(&self) -> bool {
        matches!(
            self.payment_status,
            PaymentStatus::Pending | PaymentStatus::Partial
        ) && self.status != OrderStatus::Cancelled
    }
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    /// `None` for ad-hoc lines (services, adjustments)
    pub product_id: Option<i64>,
    pub quantity: i32,
    pub unit_price: f64,
    pub line_total: f64,
}
