//! Shared types for the Lente back office
//!
//! Error types, the unified API response envelope, entity row types and
//! the dashboard analytics payload.

pub mod error;
pub mod models;
pub mod util;
