//! Organization directory
//!
//! Membership lookups the auth layer and the branch guard depend on.

use futures::FutureExt;
use futures::future::BoxFuture;
use sqlx::PgPool;

use super::{BoxError, branches, roles};

/// Role and branch ownership lookups for an organization
pub trait OrgDirectory: Send + Sync {
    /// Whether `user_id` holds the admin role in `org_id`
    fn is_org_admin<'a>(
        &'a self,
        user_id: &'a str,
        org_id: &'a str,
    ) -> BoxFuture<'a, Result<bool, BoxError>>;

    /// Whether `branch_id` exists and belongs to `org_id`
    fn branch_belongs_to_org<'a>(
        &'a self,
        org_id: &'a str,
        branch_id: i64,
    ) -> BoxFuture<'a, Result<bool, BoxError>>;
}

/// Directory backed by the Postgres schema
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl OrgDirectory for PgDirectory {
    fn is_org_admin<'a>(
        &'a self,
        user_id: &'a str,
        org_id: &'a str,
    ) -> BoxFuture<'a, Result<bool, BoxError>> {
        roles::is_org_admin(&self.pool, user_id, org_id).boxed()
    }

    fn branch_belongs_to_org<'a>(
        &'a self,
        org_id: &'a str,
        branch_id: i64,
    ) -> BoxFuture<'a, Result<bool, BoxError>> {
        branches::belongs_to_org(&self.pool, org_id, branch_id).boxed()
    }
}
