//! Authentication and authorization middleware

pub mod admin;
pub mod user_auth;

pub use admin::require_org_admin;
pub use user_auth::{UserIdentity, require_auth};
