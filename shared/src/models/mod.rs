//! Data models
//!
//! Row types read by lente-cloud and the reporting payloads it returns.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Timestamps are Unix millis, tenant ids are strings, row ids are `i64`.

pub mod analytics;
pub mod appointment;
pub mod category;
pub mod customer;
pub mod order;
pub mod product;
pub mod quote;
pub mod work_order;

// Re-exports
pub use analytics::*;
pub use appointment::*;
pub use category::*;
pub use customer::*;
pub use order::*;
pub use product::*;
pub use quote::*;
pub use work_order::*;
