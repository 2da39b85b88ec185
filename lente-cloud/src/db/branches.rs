//! Branch lookups

use sqlx::PgPool;

use super::BoxError;

/// Whether `branch_id` exists and belongs to `org_id`
pub async fn belongs_to_org(pool: &PgPool, org_id: &str, branch_id: i64) -> Result<bool, BoxError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1 AND org_id = $2)",
    )
    .bind(branch_id)
    .bind(org_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}
