//! Dashboard analytics: reporting window, revenue attribution, KPI reduction

pub mod aggregate;
pub mod money;
pub mod revenue;
pub mod window;

#[cfg(test)]
mod tests;

pub use aggregate::{AnalyticsInput, build_dashboard};
pub use window::ReportWindow;

/// Top-products list length when the request does not ask for one
pub const DEFAULT_TOP_PRODUCTS: usize = 10;
/// Upper bound accepted for the `limit` query parameter
pub const MAX_TOP_PRODUCTS: usize = 50;
