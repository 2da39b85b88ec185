//! Appointment slot checks

use sqlx::PgPool;

use super::BoxError;

#[derive(Debug, sqlx::FromRow)]
pub struct SlotCheck {
    pub available: bool,
    pub conflicts: i64,
}

/// Delegates to the `check_appointment_availability` database function
///
/// `[starts_at, ends_at)` in Unix millis.
pub async fn check_availability(
    pool: &PgPool,
    org_id: &str,
    branch_id: i64,
    starts_at: i64,
    ends_at: i64,
) -> Result<SlotCheck, BoxError> {
    let row: SlotCheck = sqlx::query_as(
        "SELECT available, conflicts FROM check_appointment_availability($1, $2, $3, $4)",
    )
    .bind(org_id)
    .bind(branch_id)
    .bind(starts_at)
    .bind(ends_at)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
