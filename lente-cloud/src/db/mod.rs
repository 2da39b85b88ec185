//! Database access layer
//!
//! All queries enforce org_id isolation.

pub mod analytics;
pub mod appointments;
pub mod branches;
pub mod directory;
pub mod roles;

pub use directory::{OrgDirectory, PgDirectory};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
