//! Dashboard KPI reduction
//!
//! Pure and synchronous: takes the rows fetched for a window and reduces
//! them to a [`DashboardAnalytics`]. Rows outside the window (or the prior
//! window, for the `previous_*` sets) are ignored.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::models::{
    Appointment, AppointmentKpis, AppointmentStatus, Category, Customer, DailyPoint,
    DashboardAnalytics, Order, OrderItem, PaymentMethod, PaymentMethodBreakdown, Product, Quote,
    QuoteKpis, SummaryKpis, Trends, WorkOrder, WorkOrderKpis, WorkOrderStatus,
};

use super::money::{amount, growth, rate, to_f64};
use super::revenue::{Attribution, Catalog};
use super::window::ReportWindow;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Raw rows for one dashboard request
#[derive(Debug, Clone, Default)]
pub struct AnalyticsInput {
    pub orders: Vec<Order>,
    pub previous_orders: Vec<Order>,
    /// Items of the current window's orders
    pub order_items: Vec<OrderItem>,
    pub work_orders: Vec<WorkOrder>,
    pub quotes: Vec<Quote>,
    pub previous_quotes: Vec<Quote>,
    pub appointments: Vec<Appointment>,
    pub customers: Vec<Customer>,
    pub previous_customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
}

/// Per-day accumulator
#[derive(Debug, Default)]
struct DayBucket {
    revenue: Decimal,
    orders: i64,
    appointments: i64,
    work_orders: i64,
    new_customers: i64,
}

/// Reduce fetched rows to the dashboard payload
pub fn build_dashboard(
    input: &AnalyticsInput,
    window: &ReportWindow,
    branch_id: Option<i64>,
    top_products_limit: usize,
) -> DashboardAnalytics {
    let revenue_orders: Vec<&Order> = input
        .orders
        .iter()
        .filter(|o| window.contains(o.created_at) && o.is_revenue())
        .collect();
    let previous_revenue_orders: Vec<&Order> = input
        .previous_orders
        .iter()
        .filter(|o| window.contains_previous(o.created_at) && o.is_revenue())
        .collect();

    let work_orders: Vec<&WorkOrder> = input
        .work_orders
        .iter()
        .filter(|w| window.contains(w.created_at))
        .collect();
    let quotes: Vec<&Quote> = input
        .quotes
        .iter()
        .filter(|q| window.contains(q.created_at))
        .collect();
    let previous_quotes: Vec<&Quote> = input
        .previous_quotes
        .iter()
        .filter(|q| window.contains_previous(q.created_at))
        .collect();
    let appointments: Vec<&Appointment> = input
        .appointments
        .iter()
        .filter(|a| window.contains(a.scheduled_at))
        .collect();
    let new_customers: Vec<&Customer> = input
        .customers
        .iter()
        .filter(|c| window.contains(c.created_at))
        .collect();
    let previous_new_customers = input
        .previous_customers
        .iter()
        .filter(|c| window.contains_previous(c.created_at))
        .count() as i64;

    let total_revenue = sum_totals(&revenue_orders);
    let previous_revenue = sum_totals(&previous_revenue_orders);

    tracing::debug!(
        revenue_orders = revenue_orders.len(),
        previous_revenue_orders = previous_revenue_orders.len(),
        work_orders = work_orders.len(),
        quotes = quotes.len(),
        appointments = appointments.len(),
        new_customers = new_customers.len(),
        "Aggregating dashboard"
    );

    let pending_payments: Decimal = input
        .orders
        .iter()
        .filter(|o| window.contains(o.created_at) && o.is_payment_pending())
        .map(|o| amount(o.total))
        .sum();

    let order_count = revenue_orders.len() as i64;
    let new_customer_count = new_customers.len() as i64;

    let summary = SummaryKpis {
        total_revenue: to_f64(total_revenue),
        previous_revenue: to_f64(previous_revenue),
        revenue_growth: growth(total_revenue, previous_revenue),
        total_orders: order_count,
        previous_orders: previous_revenue_orders.len() as i64,
        average_order_value: if order_count > 0 {
            to_f64(total_revenue / Decimal::from(order_count))
        } else {
            0.0
        },
        pending_payments: to_f64(pending_payments),
        new_customers: new_customer_count,
        previous_new_customers,
        customer_growth: growth(
            Decimal::from(new_customer_count),
            Decimal::from(previous_new_customers),
        ),
    };

    // Items only count through their (revenue) order
    let revenue_ids: HashSet<i64> = revenue_orders.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<i64, Vec<&OrderItem>> = HashMap::new();
    for item in input
        .order_items
        .iter()
        .filter(|i| revenue_ids.contains(&i.order_id))
    {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    let catalog = Catalog::new(&input.products, &input.categories);
    let attribution = Attribution::from_orders(&revenue_orders, &items_by_order, &catalog);

    DashboardAnalytics {
        period: window.period_info(branch_id),
        summary,
        quotes: quote_kpis(&quotes, &previous_quotes),
        work_orders: work_order_kpis(&work_orders),
        appointments: appointment_kpis(&appointments),
        trends: Trends {
            daily: daily_trend(
                window,
                &revenue_orders,
                &appointments,
                &work_orders,
                &new_customers,
            ),
        },
        top_products: attribution.top_products(top_products_limit),
        category_revenue: attribution.category_revenue(total_revenue),
        payment_methods: payment_breakdown(&revenue_orders),
    }
}

fn sum_totals(orders: &[&Order]) -> Decimal {
    orders.iter().map(|o| amount(o.total)).sum()
}

fn quote_kpis(quotes: &[&Quote], previous: &[&Quote]) -> QuoteKpis {
    let total = quotes.len() as i64;
    let accepted: Vec<&&Quote> = quotes.iter().filter(|q| q.status.is_accepted()).collect();
    let previous_accepted = previous.iter().filter(|q| q.status.is_accepted()).count() as i64;

    QuoteKpis {
        total,
        accepted: accepted.len() as i64,
        pending: quotes.iter().filter(|q| q.status.is_pending()).count() as i64,
        conversion_rate: rate(accepted.len() as i64, total),
        previous_conversion_rate: rate(previous_accepted, previous.len() as i64),
        total_value: to_f64(quotes.iter().map(|q| amount(q.total)).sum()),
        accepted_value: to_f64(accepted.iter().map(|q| amount(q.total)).sum()),
    }
}

fn work_order_kpis(work_orders: &[&WorkOrder]) -> WorkOrderKpis {
    let total = work_orders.len() as i64;
    let completed = work_orders
        .iter()
        .filter(|w| w.status.is_completed())
        .count() as i64;
    let cancelled = work_orders
        .iter()
        .filter(|w| w.status == WorkOrderStatus::Cancelled)
        .count() as i64;

    let turnarounds: Vec<i64> = work_orders
        .iter()
        .filter(|w| w.status == WorkOrderStatus::Delivered)
        .filter_map(|w| w.delivered_at.map(|d| d - w.created_at))
        .filter(|elapsed| *elapsed >= 0)
        .collect();
    let average_turnaround_days = if turnarounds.is_empty() {
        None
    } else {
        let total_ms: i64 = turnarounds.iter().sum();
        let days = Decimal::from(total_ms)
            / Decimal::from(MILLIS_PER_DAY)
            / Decimal::from(turnarounds.len() as i64);
        Some(to_f64(days))
    };

    WorkOrderKpis {
        total,
        completed,
        in_progress: work_orders.iter().filter(|w| w.status.is_open()).count() as i64,
        cancelled,
        completion_rate: rate(completed, total - cancelled),
        average_turnaround_days,
    }
}

fn appointment_kpis(appointments: &[&Appointment]) -> AppointmentKpis {
    let total = appointments.len() as i64;
    let count = |status: AppointmentStatus| {
        appointments.iter().filter(|a| a.status == status).count() as i64
    };
    let completed = count(AppointmentStatus::Completed);
    let no_show = count(AppointmentStatus::NoShow);

    AppointmentKpis {
        total,
        completed,
        cancelled: count(AppointmentStatus::Cancelled),
        no_show,
        completion_rate: rate(completed, total),
        no_show_rate: rate(no_show, total),
    }
}

fn daily_trend(
    window: &ReportWindow,
    revenue_orders: &[&Order],
    appointments: &[&Appointment],
    work_orders: &[&WorkOrder],
    new_customers: &[&Customer],
) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, DayBucket> = window
        .dates()
        .map(|d| (d, DayBucket::default()))
        .collect();

    for order in revenue_orders {
        if let Some(day) = day_of(&mut days, window, order.created_at) {
            day.revenue += amount(order.total);
            day.orders += 1;
        }
    }
    for appointment in appointments {
        if let Some(day) = day_of(&mut days, window, appointment.scheduled_at) {
            day.appointments += 1;
        }
    }
    for work_order in work_orders {
        if let Some(day) = day_of(&mut days, window, work_order.created_at) {
            day.work_orders += 1;
        }
    }
    for customer in new_customers {
        if let Some(day) = day_of(&mut days, window, customer.created_at) {
            day.new_customers += 1;
        }
    }

    days.into_iter()
        .map(|(date, b)| DailyPoint {
            date: date.format("%Y-%m-%d").to_string(),
            revenue: to_f64(b.revenue),
            orders: b.orders,
            appointments: b.appointments,
            work_orders: b.work_orders,
            new_customers: b.new_customers,
        })
        .collect()
}

fn day_of<'a>(
    days: &'a mut BTreeMap<NaiveDate, DayBucket>,
    window: &ReportWindow,
    ts_ms: i64,
) -> Option<&'a mut DayBucket> {
    window.bucket(ts_ms).and_then(move |d| days.get_mut(&d))
}

fn payment_breakdown(revenue_orders: &[&Order]) -> Vec<PaymentMethodBreakdown> {
    let mut by_method: HashMap<PaymentMethod, (Decimal, i64)> = HashMap::new();
    for order in revenue_orders {
        let method = order.payment_method.unwrap_or(PaymentMethod::Other);
        let entry = by_method.entry(method).or_default();
        entry.0 += amount(order.total);
        entry.1 += 1;
    }

    let mut rows: Vec<(PaymentMethod, (Decimal, i64))> = by_method.into_iter().collect();
    rows.sort_by(|(a_method, (a_amount, _)), (b_method, (b_amount, _))| {
        b_amount.cmp(a_amount).then_with(|| a_method.cmp(b_method))
    });
    rows.into_iter()
        .map(|(method, (total, count))| PaymentMethodBreakdown {
            method: method.as_str().to_string(),
            amount: to_f64(total),
            count,
        })
        .collect()
}
