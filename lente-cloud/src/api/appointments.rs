//! Appointment slot availability

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::AvailabilityResponse;

use crate::auth::UserIdentity;
use crate::db::appointments;
use crate::error::ServiceError;
use crate::state::AppState;

use super::{ApiResult, query_error, verify_branch};

pub const MIN_DURATION_MINUTES: i64 = 5;
pub const MAX_DURATION_MINUTES: i64 = 480;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// GET /api/appointments/availability?branchId=&startsAt=&durationMinutes=
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub branch_id: i64,
    /// Unix millis
    pub starts_at: i64,
    pub duration_minutes: i64,
}

impl AvailabilityQuery {
    /// `[starts_at, ends_at)` of the requested slot
    pub fn slot(&self) -> AppResult<(i64, i64)> {
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&self.duration_minutes) {
            return Err(AppError::with_message(
                ErrorCode::AppointmentInvalidDuration,
                format!(
                    "durationMinutes must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES}"
                ),
            )
            .with_detail("field", "durationMinutes"));
        }
        if self.starts_at <= 0 {
            return Err(AppError::validation("startsAt must be a Unix timestamp in milliseconds")
                .with_detail("field", "startsAt"));
        }
        let ends_at = self
            .duration_minutes
            .checked_mul(MILLIS_PER_MINUTE)
            .and_then(|duration| self.starts_at.checked_add(duration))
            .ok_or_else(|| {
                AppError::validation("startsAt is out of range").with_detail("field", "startsAt")
            })?;
        Ok((self.starts_at, ends_at))
    }
}

pub async fn check_availability(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> ApiResult<AvailabilityResponse> {
    let Query(query) = query.map_err(query_error)?;
    let (starts_at, ends_at) = query.slot()?;

    verify_branch(&state, &identity, query.branch_id).await?;

    let slot = appointments::check_availability(
        &state.pool,
        &identity.org_id,
        query.branch_id,
        starts_at,
        ends_at,
    )
    .await
    .map_err(ServiceError::from)?;

    tracing::debug!(
        org_id = %identity.org_id,
        branch_id = query.branch_id,
        starts_at,
        available = slot.available,
        conflicts = slot.conflicts,
        "Appointment availability checked"
    );

    Ok(Json(AvailabilityResponse {
        available: slot.available,
        branch_id: query.branch_id,
        starts_at,
        ends_at,
        conflicts: slot.conflicts,
    }))
}
