//! Time-windowed reads for the analytics dashboard
//!
//! Every query is scoped by `org_id` and, when given, `branch_id`.
//! Time ranges are half-open `[start_ms, end_ms)` in Unix millis.

use shared::models::{
    Appointment, Category, Customer, Order, OrderItem, Product, Quote, WorkOrder,
};
use sqlx::PgPool;

use super::BoxError;
use crate::analytics::{AnalyticsInput, ReportWindow};

/// Organization + optional branch filter
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub org_id: &'a str,
    pub branch_id: Option<i64>,
}

pub async fn fetch_orders(
    pool: &PgPool,
    scope: Scope<'_>,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<Order>, BoxError> {
    let rows: Vec<Order> = sqlx::query_as(
        r#"
        SELECT id, org_id, branch_id, customer_id, status, payment_status,
               payment_method, total, created_at
        FROM orders
        WHERE org_id = $1
          AND ($2::BIGINT IS NULL OR branch_id = $2)
          AND created_at >= $3 AND created_at < $4
        "#,
    )
    .bind(scope.org_id)
    .bind(scope.branch_id)
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Items of the orders created in the window
pub async fn fetch_order_items(
    pool: &PgPool,
    scope: Scope<'_>,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<OrderItem>, BoxError> {
    let rows: Vec<OrderItem> = sqlx::query_as(
        r#"
        SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.unit_price, oi.line_total
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        WHERE o.org_id = $1
          AND ($2::BIGINT IS NULL OR o.branch_id = $2)
          AND o.created_at >= $3 AND o.created_at < $4
        ORDER BY oi.order_id, oi.id
        "#,
    )
    .bind(scope.org_id)
    .bind(scope.branch_id)
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn fetch_work_orders(
    pool: &PgPool,
    scope: Scope<'_>,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<WorkOrder>, BoxError> {
    let rows: Vec<WorkOrder> = sqlx::query_as(
        r#"
        SELECT id, org_id, branch_id, customer_id, status, created_at, delivered_at
        FROM work_orders
        WHERE org_id = $1
          AND ($2::BIGINT IS NULL OR branch_id = $2)
          AND created_at >= $3 AND created_at < $4
        "#,
    )
    .bind(scope.org_id)
    .bind(scope.branch_id)
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn fetch_quotes(
    pool: &PgPool,
    scope: Scope<'_>,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<Quote>, BoxError> {
    let rows: Vec<Quote> = sqlx::query_as(
        r#"
        SELECT id, org_id, branch_id, customer_id, status, total, created_at
        FROM quotes
        WHERE org_id = $1
          AND ($2::BIGINT IS NULL OR branch_id = $2)
          AND created_at >= $3 AND created_at < $4
        "#,
    )
    .bind(scope.org_id)
    .bind(scope.branch_id)
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Appointments are windowed by `scheduled_at`, not creation time
pub async fn fetch_appointments(
    pool: &PgPool,
    scope: Scope<'_>,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<Appointment>, BoxError> {
    let rows: Vec<Appointment> = sqlx::query_as(
        r#"
        SELECT id, org_id, branch_id, customer_id, status, scheduled_at,
               duration_minutes, created_at
        FROM appointments
        WHERE org_id = $1
          AND ($2::BIGINT IS NULL OR branch_id = $2)
          AND scheduled_at >= $3 AND scheduled_at < $4
        "#,
    )
    .bind(scope.org_id)
    .bind(scope.branch_id)
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Customers registered in the window
pub async fn fetch_customers(
    pool: &PgPool,
    scope: Scope<'_>,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<Customer>, BoxError> {
    let rows: Vec<Customer> = sqlx::query_as(
        r#"
        SELECT id, org_id, branch_id, created_at
        FROM customers
        WHERE org_id = $1
          AND ($2::BIGINT IS NULL OR branch_id = $2)
          AND created_at >= $3 AND created_at < $4
        "#,
    )
    .bind(scope.org_id)
    .bind(scope.branch_id)
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Whole catalog of the organization (not branch- or time-scoped)
pub async fn fetch_products(pool: &PgPool, org_id: &str) -> Result<Vec<Product>, BoxError> {
    let rows: Vec<Product> = sqlx::query_as(
        "SELECT id, org_id, name, category_id FROM products WHERE org_id = $1",
    )
    .bind(org_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn fetch_categories(pool: &PgPool, org_id: &str) -> Result<Vec<Category>, BoxError> {
    let rows: Vec<Category> =
        sqlx::query_as("SELECT id, org_id, name FROM categories WHERE org_id = $1")
            .bind(org_id)
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

/// Fetch every row set the dashboard needs, concurrently
///
/// Any failing query aborts the whole fetch.
pub async fn fetch_analytics_input(
    pool: &PgPool,
    scope: Scope<'_>,
    window: &ReportWindow,
) -> Result<AnalyticsInput, BoxError> {
    let (start, end) = (window.start_ms, window.end_ms);
    let (prev_start, prev_end) = (window.prev_start_ms, window.prev_end_ms);

    let (
        orders,
        previous_orders,
        order_items,
        work_orders,
        quotes,
        previous_quotes,
        appointments,
        customers,
        previous_customers,
        products,
        categories,
    ) = tokio::try_join!(
        fetch_orders(pool, scope, start, end),
        fetch_orders(pool, scope, prev_start, prev_end),
        fetch_order_items(pool, scope, start, end),
        fetch_work_orders(pool, scope, start, end),
        fetch_quotes(pool, scope, start, end),
        fetch_quotes(pool, scope, prev_start, prev_end),
        fetch_appointments(pool, scope, start, end),
        fetch_customers(pool, scope, start, end),
        fetch_customers(pool, scope, prev_start, prev_end),
        fetch_products(pool, scope.org_id),
        fetch_categories(pool, scope.org_id),
    )?;

    tracing::debug!(
        org_id = %scope.org_id,
        branch_id = ?scope.branch_id,
        start = %window.start_date,
        end = %window.end_date,
        orders = orders.len(),
        previous_orders = previous_orders.len(),
        order_items = order_items.len(),
        work_orders = work_orders.len(),
        quotes = quotes.len(),
        appointments = appointments.len(),
        customers = customers.len(),
        "Fetched analytics rows"
    );

    Ok(AnalyticsInput {
        orders,
        previous_orders,
        order_items,
        work_orders,
        quotes,
        previous_quotes,
        appointments,
        customers,
        previous_customers,
        products,
        categories,
    })
}
