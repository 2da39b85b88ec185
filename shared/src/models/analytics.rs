//! Dashboard analytics response types
//!
//! Money is serialized as `f64` rounded to 2 decimal places, percentages
//! as `f64` rounded to 2 decimal places.

use serde::{Deserialize, Serialize};

/// Full dashboard payload for one reporting window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAnalytics {
    pub period: PeriodInfo,
    pub summary: SummaryKpis,
    pub quotes: QuoteKpis,
    pub work_orders: WorkOrderKpis,
    pub appointments: AppointmentKpis,
    pub trends: Trends,
    pub top_products: Vec<TopProduct>,
    pub category_revenue: Vec<CategoryRevenue>,
    pub payment_methods: Vec<PaymentMethodBreakdown>,
}

/// Window the figures were computed over (business-timezone dates)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInfo {
    /// YYYY-MM-DD
    pub start_date: String,
    /// YYYY-MM-DD, inclusive
    pub end_date: String,
    pub previous_start_date: String,
    pub previous_end_date: String,
    pub days: i64,
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryKpis {
    pub total_revenue: f64,
    pub previous_revenue: f64,
    pub revenue_growth: f64,
    pub total_orders: i64,
    pub previous_orders: i64,
    pub average_order_value: f64,
    pub pending_payments: f64,
    pub new_customers: i64,
    pub previous_new_customers: i64,
    pub customer_growth: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteKpis {
    pub total: i64,
    pub accepted: i64,
    pub pending: i64,
    pub conversion_rate: f64,
    pub previous_conversion_rate: f64,
    pub total_value: f64,
    pub accepted_value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderKpis {
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
    pub cancelled: i64,
    pub completion_rate: f64,
    /// Mean days from creation to delivery, `None` when nothing was delivered
    pub average_turnaround_days: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentKpis {
    pub total: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub no_show: i64,
    pub completion_rate: f64,
    pub no_show_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub daily: Vec<DailyPoint>,
}

/// Per-day bucket; every day of the window is present
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    /// YYYY-MM-DD
    pub date: String,
    pub revenue: f64,
    pub orders: i64,
    pub appointments: i64,
    pub work_orders: i64,
    pub new_customers: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    /// `None` for the "General" fallback bucket
    pub product_id: Option<i64>,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRevenue {
    pub name: String,
    pub revenue: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodBreakdown {
    pub method: String,
    pub amount: f64,
    pub count: i64,
}
