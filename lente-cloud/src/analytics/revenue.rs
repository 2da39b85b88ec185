//! Revenue attribution: orders → products → categories
//!
//! Each revenue order's total is split over its line items in proportion to
//! `line_total`, so product and category revenue add up to exactly the
//! order totals (discounts and tax included, nothing counted twice).

use std::collections::HashMap;

use rust_decimal::Decimal;
use shared::models::{Category, CategoryRevenue, Order, OrderItem, Product, TopProduct};

use super::money::{amount, percentage, round_money, to_decimal, to_f64};

/// Bucket for lines without a (known) product
pub const FALLBACK_PRODUCT: &str = "General";
/// Bucket for products without a (known) category
pub const FALLBACK_CATEGORY: &str = "Sin Categoría";

/// Product / category lookup for one organization
pub struct Catalog<'a> {
    products: HashMap<i64, &'a Product>,
    categories: HashMap<i64, &'a str>,
}

impl<'a> Catalog<'a> {
    pub fn new(products: &'a [Product], categories: &'a [Category]) -> Self {
        Self {
            products: products.iter().map(|p| (p.id, p)).collect(),
            categories: categories.iter().map(|c| (c.id, c.name.as_str())).collect(),
        }
    }

    fn product(&self, product_id: Option<i64>) -> Option<&'a Product> {
        product_id.and_then(|id| self.products.get(&id).copied())
    }

    fn category_name(&self, product: Option<&Product>) -> &'a str {
        product
            .and_then(|p| p.category_id)
            .and_then(|id| self.categories.get(&id).copied())
            .unwrap_or(FALLBACK_CATEGORY)
    }
}

#[derive(Debug, Default)]
struct ProductTotals {
    name: String,
    category: String,
    quantity: i64,
    revenue: Decimal,
}

/// Accumulated product and category revenue over a set of orders
#[derive(Debug, Default)]
pub struct Attribution {
    /// `None` key = the "General" bucket
    products: HashMap<Option<i64>, ProductTotals>,
    categories: HashMap<String, Decimal>,
}

impl Attribution {
    /// Split every order's total over its items and accumulate
    pub fn from_orders(
        orders: &[&Order],
        items_by_order: &HashMap<i64, Vec<&OrderItem>>,
        catalog: &Catalog<'_>,
    ) -> Self {
        let mut attribution = Self::default();
        for order in orders {
            let items = items_by_order
                .get(&order.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            attribution.add_order(order, items, catalog);
        }
        attribution
    }

    fn add_order(&mut self, order: &Order, items: &[&OrderItem], catalog: &Catalog<'_>) {
        let total = amount(order.total);
        let weight_sum: Decimal = items.iter().map(|i| to_decimal(i.line_total)).sum();

        if items.is_empty() || weight_sum <= Decimal::ZERO {
            self.credit(None, catalog, 0, total);
            return;
        }

        let mut allocated = Decimal::ZERO;
        let last = items.len() - 1;
        for (idx, item) in items.iter().enumerate() {
            let share = if idx == last {
                total - allocated
            } else {
                round_money(total * to_decimal(item.line_total) / weight_sum)
            };
            allocated += share;
            self.credit(item.product_id, catalog, i64::from(item.quantity), share);
        }
    }

    fn credit(
        &mut self,
        product_id: Option<i64>,
        catalog: &Catalog<'_>,
        quantity: i64,
        revenue: Decimal,
    ) {
        let product = catalog.product(product_id);
        let category = catalog.category_name(product);
        let key = product.map(|p| p.id);

        let entry = self.products.entry(key).or_insert_with(|| ProductTotals {
            name: product
                .map(|p| p.name.clone())
                .unwrap_or_else(|| FALLBACK_PRODUCT.to_string()),
            category: category.to_string(),
            ..Default::default()
        });
        entry.quantity += quantity;
        entry.revenue += revenue;

        *self.categories.entry(category.to_string()).or_default() += revenue;
    }

    /// Best sellers by revenue, descending; ties by name, then id
    pub fn top_products(&self, limit: usize) -> Vec<TopProduct> {
        let mut ranked: Vec<(&Option<i64>, &ProductTotals)> = self.products.iter().collect();
        ranked.sort_by(|(a_id, a), (b_id, b)| {
            b.revenue
                .cmp(&a.revenue)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a_id.cmp(b_id))
        });
        ranked
            .into_iter()
            .take(limit)
            .map(|(id, t)| TopProduct {
                product_id: *id,
                name: t.name.clone(),
                category: t.category.clone(),
                quantity: t.quantity,
                revenue: to_f64(t.revenue),
            })
            .collect()
    }

    /// Revenue per category, descending, with its share of `total_revenue`
    pub fn category_revenue(&self, total_revenue: Decimal) -> Vec<CategoryRevenue> {
        let mut rows: Vec<(&String, &Decimal)> = self.categories.iter().collect();
        rows.sort_by(|(a_name, a), (b_name, b)| b.cmp(a).then_with(|| a_name.cmp(b_name)));
        rows.into_iter()
            .map(|(name, revenue)| CategoryRevenue {
                name: name.clone(),
                revenue: to_f64(*revenue),
                percentage: percentage(*revenue, total_revenue),
            })
            .collect()
    }
}
