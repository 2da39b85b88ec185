//! Organization role checks

use sqlx::PgPool;

use super::BoxError;

/// Delegates to the `is_org_admin` database function
///
/// A user that is not a member of the organization is not an admin.
pub async fn is_org_admin(pool: &PgPool, user_id: &str, org_id: &str) -> Result<bool, BoxError> {
    let is_admin: Option<bool> = sqlx::query_scalar("SELECT is_org_admin($1, $2)")
        .bind(user_id)
        .bind(org_id)
        .fetch_one(pool)
        .await?;
    Ok(is_admin.unwrap_or(false))
}
