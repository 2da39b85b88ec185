use rust_decimal::Decimal;

use super::money::to_decimal;
use super::*;
use chrono::NaiveDate;
use shared::models::*;

const DAY: i64 = 86_400_000;

fn window() -> ReportWindow {
    // 2026-03-01 ..= 2026-03-10, prior window 2026-02-19 ..= 2026-02-28
    ReportWindow::new(
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        chrono_tz::UTC,
    )
    .unwrap()
}

/// Unix millis of `day` (0-based) inside the window, plus one hour
fn at(day: i64) -> i64 {
    window().start_ms + day * DAY + 3_600_000
}

fn paid_order(id: i64, total: f64, created_at: i64) -> Order {
    Order {
        id,
        org_id: "org-1".into(),
        branch_id: 1,
        customer_id: None,
        status: OrderStatus::Completed,
        payment_status: PaymentStatus::Paid,
        payment_method: Some(PaymentMethod::Card),
        total,
        created_at,
    }
}

fn quote(id: i64, status: QuoteStatus, total: f64, created_at: i64) -> Quote {
    Quote {
        id,
        org_id: "org-1".into(),
        branch_id: 1,
        customer_id: None,
        status,
        total,
        created_at,
    }
}

fn work_order(
    id: i64,
    status: WorkOrderStatus,
    created_at: i64,
    delivered_at: Option<i64>,
) -> WorkOrder {
    WorkOrder {
        id,
        org_id: "org-1".into(),
        branch_id: 1,
        customer_id: None,
        status,
        created_at,
        delivered_at,
    }
}

fn appointment(id: i64, status: AppointmentStatus, scheduled_at: i64) -> Appointment {
    Appointment {
        id,
        org_id: "org-1".into(),
        branch_id: 1,
        customer_id: None,
        status,
        scheduled_at,
        duration_minutes: 30,
        created_at: scheduled_at - DAY,
    }
}

fn customer(id: i64, created_at: i64) -> Customer {
    Customer {
        id,
        org_id: "org-1".into(),
        branch_id: Some(1),
        created_at,
    }
}

fn item(
    id: i64,
    order_id: i64,
    product_id: Option<i64>,
    quantity: i32,
    line_total: f64,
) -> OrderItem {
    OrderItem {
        id,
        order_id,
        product_id,
        quantity,
        unit_price: line_total / f64::from(quantity),
        line_total,
    }
}

fn product(id: i64, name: &str, category_id: i64) -> Product {
    Product {
        id,
        org_id: "org-1".into(),
        name: name.into(),
        category_id: Some(category_id),
    }
}

fn category(id: i64, name: &str) -> Category {
    Category {
        id,
        org_id: "org-1".into(),
        name: name.into(),
    }
}

fn catalog() -> (Vec<Product>, Vec<Category>) {
    (
        vec![
            product(1, "Montura titanio", 1),
            product(2, "Lente monofocal", 2),
            product(3, "Lentillas mensuales", 3),
        ],
        vec![
            category(1, "Monturas"),
            category(2, "Lentes"),
            category(3, "Contactología"),
        ],
    )
}

/// Exact sum of response amounts, no re-rounding
fn exact_sum(values: impl Iterator<Item = f64>) -> Decimal {
    values.map(to_decimal).sum()
}

#[test]
fn test_revenue_growth_example() {
    let w = window();
    let input = AnalyticsInput {
        orders: vec![paid_order(1, 1000.0, at(0)), paid_order(2, 2000.0, at(4))],
        previous_orders: vec![paid_order(3, 500.0, w.prev_start_ms + DAY)],
        ..Default::default()
    };

    let dashboard = build_dashboard(&input, &w, None, DEFAULT_TOP_PRODUCTS);
    assert_eq!(dashboard.summary.total_revenue, 3000.0);
    assert_eq!(dashboard.summary.previous_revenue, 500.0);
    assert_eq!(dashboard.summary.revenue_growth, 500.0);
    assert_eq!(dashboard.summary.total_orders, 2);
    assert_eq!(dashboard.summary.previous_orders, 1);
    assert_eq!(dashboard.summary.average_order_value, 1500.0);
}

#[test]
fn test_empty_windows_yield_zeros() {
    let w = window();
    let dashboard = build_dashboard(&AnalyticsInput::default(), &w, Some(1), DEFAULT_TOP_PRODUCTS);

    assert_eq!(dashboard.summary.total_revenue, 0.0);
    assert_eq!(dashboard.summary.revenue_growth, 0.0);
    assert_eq!(dashboard.summary.customer_growth, 0.0);
    assert_eq!(dashboard.summary.average_order_value, 0.0);
    assert_eq!(dashboard.quotes.conversion_rate, 0.0);
    assert_eq!(dashboard.work_orders.completion_rate, 0.0);
    assert_eq!(dashboard.work_orders.average_turnaround_days, None);
    assert_eq!(dashboard.appointments.completion_rate, 0.0);
    assert_eq!(dashboard.appointments.no_show_rate, 0.0);
    assert!(dashboard.top_products.is_empty());
    assert!(dashboard.category_revenue.is_empty());
    assert!(dashboard.payment_methods.is_empty());

    // every day is present even without data
    assert_eq!(dashboard.trends.daily.len(), 10);
    assert!(dashboard.trends.daily.iter().all(|d| d.revenue == 0.0 && d.orders == 0));
    assert_eq!(dashboard.period.branch_id, Some(1));

    let json = serde_json::to_string(&dashboard).unwrap();
    assert!(!json.contains("NaN"));
    assert!(!json.contains("inf"));
}

#[test]
fn test_growth_zero_when_previous_empty() {
    let w = window();
    let input = AnalyticsInput {
        orders: vec![paid_order(1, 800.0, at(2))],
        customers: vec![customer(1, at(1))],
        ..Default::default()
    };
    let dashboard = build_dashboard(&input, &w, None, DEFAULT_TOP_PRODUCTS);
    assert_eq!(dashboard.summary.revenue_growth, 0.0);
    assert_eq!(dashboard.summary.customer_growth, 0.0);
    assert_eq!(dashboard.summary.new_customers, 1);
}

#[test]
fn test_only_paid_orders_count_as_revenue() {
    let w = window();
    let mut cancelled = paid_order(2, 300.0, at(1));
    cancelled.status = OrderStatus::Cancelled;
    let mut partial = paid_order(3, 200.0, at(1));
    partial.payment_status = PaymentStatus::Partial;
    let mut refunded = paid_order(4, 150.0, at(1));
    refunded.payment_status = PaymentStatus::Refunded;
    refunded.status = OrderStatus::Refunded;

    let input = AnalyticsInput {
        orders: vec![paid_order(1, 100.0, at(1)), cancelled, partial, refunded],
        ..Default::default()
    };
    let dashboard = build_dashboard(&input, &w, None, DEFAULT_TOP_PRODUCTS);
    assert_eq!(dashboard.summary.total_revenue, 100.0);
    assert_eq!(dashboard.summary.total_orders, 1);
    assert_eq!(dashboard.summary.pending_payments, 200.0);
}

#[test]
fn test_rows_outside_window_ignored() {
    let w = window();
    let input = AnalyticsInput {
        orders: vec![
            paid_order(1, 100.0, at(0)),
            paid_order(2, 999.0, w.end_ms),
            paid_order(3, 999.0, w.start_ms - 1),
        ],
        previous_orders: vec![paid_order(4, 50.0, w.prev_start_ms - 1)],
        ..Default::default()
    };
    let dashboard = build_dashboard(&input, &w, None, DEFAULT_TOP_PRODUCTS);
    assert_eq!(dashboard.summary.total_revenue, 100.0);
    assert_eq!(dashboard.summary.previous_revenue, 0.0);
}

#[test]
fn test_revenue_totals_match_breakdowns() {
    let w = window();
    let (products, categories) = catalog();
    let mut cash = paid_order(3, 89.9, at(5));
    cash.payment_method = Some(PaymentMethod::Cash);
    let mut unknown_method = paid_order(4, 45.5, at(9));
    unknown_method.payment_method = None;

    let input = AnalyticsInput {
        orders: vec![
            paid_order(1, 249.99, at(0)),
            paid_order(2, 410.0, at(0)),
            cash,
            unknown_method,
        ],
        order_items: vec![
            item(1, 1, Some(1), 1, 150.0),
            item(2, 1, Some(2), 2, 120.0),
            item(3, 2, Some(2), 2, 260.0),
            item(4, 2, Some(3), 3, 150.0),
            item(5, 3, Some(3), 1, 89.9),
            // item of an order outside the revenue set is ignored
            item(6, 99, Some(1), 1, 1000.0),
        ],
        products,
        categories,
        ..Default::default()
    };

    let dashboard = build_dashboard(&input, &w, None, DEFAULT_TOP_PRODUCTS);
    assert_eq!(dashboard.summary.total_revenue, 795.39);
    let total = to_decimal(dashboard.summary.total_revenue);

    assert_eq!(exact_sum(dashboard.trends.daily.iter().map(|d| d.revenue)), total);
    assert_eq!(exact_sum(dashboard.category_revenue.iter().map(|c| c.revenue)), total);
    assert_eq!(exact_sum(dashboard.payment_methods.iter().map(|p| p.amount)), total);
    assert_eq!(exact_sum(dashboard.top_products.iter().map(|p| p.revenue)), total);

    let daily_orders: i64 = dashboard.trends.daily.iter().map(|d| d.orders).sum();
    assert_eq!(daily_orders, 4);
    assert_eq!(dashboard.trends.daily[0].orders, 2);
    assert_eq!(dashboard.trends.daily[0].date, "2026-03-01");

    // order 4 has no items → "General" / "Sin Categoría"
    assert!(dashboard.top_products.iter().any(|p| p.name == revenue::FALLBACK_PRODUCT));
    assert!(
        dashboard
            .category_revenue
            .iter()
            .any(|c| c.name == revenue::FALLBACK_CATEGORY)
    );

    let other = dashboard
        .payment_methods
        .iter()
        .find(|p| p.method == "other")
        .unwrap();
    assert_eq!(other.amount, 45.5);
    assert_eq!(other.count, 1);
}

#[test]
fn test_sub_cent_totals_keep_breakdowns_exact() {
    let w = window();
    let mut transfer = paid_order(3, 10.125, at(2));
    transfer.payment_method = Some(PaymentMethod::Transfer);
    let input = AnalyticsInput {
        orders: vec![paid_order(1, 10.125, at(0)), paid_order(2, 10.125, at(1)), transfer],
        order_items: vec![
            item(1, 1, Some(1), 1, 5.0),
            item(2, 1, Some(2), 1, 5.0),
            item(3, 2, Some(3), 3, 7.5),
        ],
        products: catalog().0,
        categories: catalog().1,
        ..Default::default()
    };

    let dashboard = build_dashboard(&input, &w, None, DEFAULT_TOP_PRODUCTS);
    assert_eq!(dashboard.summary.total_revenue, 30.39);
    assert_eq!(dashboard.summary.average_order_value, 10.13);
    let total = to_decimal(dashboard.summary.total_revenue);

    let daily: Vec<f64> = dashboard.trends.daily[..3].iter().map(|d| d.revenue).collect();
    assert_eq!(daily, vec![10.13, 10.13, 10.13]);
    assert_eq!(exact_sum(dashboard.trends.daily.iter().map(|d| d.revenue)), total);
    assert_eq!(exact_sum(dashboard.category_revenue.iter().map(|c| c.revenue)), total);
    assert_eq!(exact_sum(dashboard.payment_methods.iter().map(|p| p.amount)), total);
    assert_eq!(exact_sum(dashboard.top_products.iter().map(|p| p.revenue)), total);
}

#[test]
fn test_top_products_limit_and_order() {
    let w = window();
    let (products, categories) = catalog();
    let input = AnalyticsInput {
        orders: vec![
            paid_order(1, 100.0, at(0)),
            paid_order(2, 300.0, at(1)),
            paid_order(3, 200.0, at(2)),
        ],
        order_items: vec![
            item(1, 1, Some(1), 1, 100.0),
            item(2, 2, Some(2), 1, 300.0),
            item(3, 3, Some(3), 4, 200.0),
        ],
        products,
        categories,
        ..Default::default()
    };

    let dashboard = build_dashboard(&input, &w, None, 2);
    assert_eq!(dashboard.top_products.len(), 2);
    assert_eq!(dashboard.top_products[0].name, "Lente monofocal");
    assert_eq!(dashboard.top_products[1].name, "Lentillas mensuales");
    assert_eq!(dashboard.top_products[1].quantity, 4);
    assert!(
        dashboard
            .top_products
            .windows(2)
            .all(|p| p[0].revenue >= p[1].revenue)
    );
    // category breakdown is not truncated
    assert_eq!(dashboard.category_revenue.len(), 3);
    assert_eq!(dashboard.category_revenue[0].percentage, 50.0);
}

#[test]
fn test_quote_conversion() {
    let w = window();
    let input = AnalyticsInput {
        quotes: vec![
            quote(1, QuoteStatus::Accepted, 300.0, at(0)),
            quote(2, QuoteStatus::Converted, 200.0, at(1)),
            quote(3, QuoteStatus::Rejected, 150.0, at(2)),
            quote(4, QuoteStatus::Sent, 100.0, at(3)),
        ],
        previous_quotes: vec![
            quote(5, QuoteStatus::Accepted, 100.0, w.prev_start_ms),
            quote(6, QuoteStatus::Expired, 100.0, w.prev_start_ms),
        ],
        ..Default::default()
    };
    let dashboard = build_dashboard(&input, &w, None, DEFAULT_TOP_PRODUCTS);
    assert_eq!(dashboard.quotes.total, 4);
    assert_eq!(dashboard.quotes.accepted, 2);
    assert_eq!(dashboard.quotes.pending, 1);
    assert_eq!(dashboard.quotes.conversion_rate, 50.0);
    assert_eq!(dashboard.quotes.previous_conversion_rate, 50.0);
    assert_eq!(dashboard.quotes.total_value, 750.0);
    assert_eq!(dashboard.quotes.accepted_value, 500.0);
}

#[test]
fn test_work_order_completion_and_turnaround() {
    let w = window();
    let input = AnalyticsInput {
        work_orders: vec![
            work_order(1, WorkOrderStatus::Delivered, at(0), Some(at(0) + 2 * DAY)),
            work_order(2, WorkOrderStatus::Delivered, at(1), Some(at(1) + 4 * DAY)),
            work_order(3, WorkOrderStatus::Ready, at(2), None),
            work_order(4, WorkOrderStatus::InLab, at(3), None),
            work_order(5, WorkOrderStatus::Cancelled, at(3), None),
        ],
        ..Default::default()
    };
    let dashboard = build_dashboard(&input, &w, None, DEFAULT_TOP_PRODUCTS);
    let kpis = &dashboard.work_orders;
    assert_eq!(kpis.total, 5);
    assert_eq!(kpis.completed, 3);
    assert_eq!(kpis.in_progress, 1);
    assert_eq!(kpis.cancelled, 1);
    // 3 of the 4 non-cancelled
    assert_eq!(kpis.completion_rate, 75.0);
    assert_eq!(kpis.average_turnaround_days, Some(3.0));
    assert_eq!(dashboard.trends.daily[3].work_orders, 2);
}

#[test]
fn test_all_cancelled_work_orders_rate_is_zero() {
    let w = window();
    let input = AnalyticsInput {
        work_orders: vec![work_order(1, WorkOrderStatus::Cancelled, at(0), None)],
        ..Default::default()
    };
    let dashboard = build_dashboard(&input, &w, None, DEFAULT_TOP_PRODUCTS);
    assert_eq!(dashboard.work_orders.completion_rate, 0.0);
}

#[test]
fn test_appointment_rates() {
    let w = window();
    let input = AnalyticsInput {
        appointments: vec![
            appointment(1, AppointmentStatus::Completed, at(0)),
            appointment(2, AppointmentStatus::Completed, at(0)),
            appointment(3, AppointmentStatus::NoShow, at(1)),
            appointment(4, AppointmentStatus::Cancelled, at(2)),
            appointment(5, AppointmentStatus::Confirmed, at(9)),
            appointment(6, AppointmentStatus::Completed, w.end_ms + DAY),
        ],
        ..Default::default()
    };
    let dashboard = build_dashboard(&input, &w, None, DEFAULT_TOP_PRODUCTS);
    let kpis = &dashboard.appointments;
    assert_eq!(kpis.total, 5);
    assert_eq!(kpis.completed, 2);
    assert_eq!(kpis.no_show, 1);
    assert_eq!(kpis.cancelled, 1);
    assert_eq!(kpis.completion_rate, 40.0);
    assert_eq!(kpis.no_show_rate, 20.0);
    assert!((0.0..=100.0).contains(&kpis.completion_rate));
    assert_eq!(dashboard.trends.daily[0].appointments, 2);
    assert_eq!(dashboard.trends.daily[9].appointments, 1);
}

#[test]
fn test_customer_growth() {
    let w = window();
    let input = AnalyticsInput {
        customers: vec![customer(1, at(0)), customer(2, at(3)), customer(3, at(3))],
        previous_customers: vec![
            customer(4, w.prev_start_ms + DAY),
            customer(5, w.prev_start_ms + 2 * DAY),
        ],
        ..Default::default()
    };
    let dashboard = build_dashboard(&input, &w, None, DEFAULT_TOP_PRODUCTS);
    assert_eq!(dashboard.summary.new_customers, 3);
    assert_eq!(dashboard.summary.previous_new_customers, 2);
    assert_eq!(dashboard.summary.customer_growth, 50.0);
    assert_eq!(dashboard.trends.daily[3].new_customers, 2);
}
