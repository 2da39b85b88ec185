//! Analytics dashboard endpoint

use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::DashboardAnalytics;

use crate::analytics::{self, DEFAULT_TOP_PRODUCTS, MAX_TOP_PRODUCTS, ReportWindow};
use crate::auth::UserIdentity;
use crate::db::analytics::{Scope, fetch_analytics_input};
use crate::error::ServiceError;
use crate::state::AppState;

use super::{ApiResult, query_error, verify_branch};

/// GET /api/analytics/dashboard?startDate=YYYY-MM-DD&endDate=YYYY-MM-DD&branchId=&limit=
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub branch_id: Option<i64>,
    /// Top products to return
    pub limit: Option<usize>,
}

/// Validated request parameters
#[derive(Debug)]
pub struct DashboardParams {
    pub window: ReportWindow,
    pub branch_id: Option<i64>,
    pub limit: usize,
}

impl DashboardQuery {
    pub fn validate(&self, today: NaiveDate, tz: Tz) -> AppResult<DashboardParams> {
        let window = ReportWindow::resolve(
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            today,
            tz,
        )?;

        let limit = self.limit.unwrap_or(DEFAULT_TOP_PRODUCTS);
        if !(1..=MAX_TOP_PRODUCTS).contains(&limit) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("limit must be between 1 and {MAX_TOP_PRODUCTS}"),
            )
            .with_detail("field", "limit"));
        }

        if let Some(id) = self.branch_id
            && id <= 0
        {
            return Err(AppError::validation("branchId must be positive")
                .with_detail("field", "branchId"));
        }

        Ok(DashboardParams {
            window,
            branch_id: self.branch_id,
            limit,
        })
    }
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> ApiResult<DashboardAnalytics> {
    let Query(query) = query.map_err(query_error)?;
    let params = query.validate(state.today(), state.timezone)?;

    if let Some(branch_id) = params.branch_id {
        verify_branch(&state, &identity, branch_id).await?;
    }

    let scope = Scope {
        org_id: &identity.org_id,
        branch_id: params.branch_id,
    };
    let input = fetch_analytics_input(&state.pool, scope, &params.window)
        .await
        .map_err(ServiceError::from)?;

    let dashboard =
        analytics::build_dashboard(&input, &params.window, params.branch_id, params.limit);

    tracing::info!(
        org_id = %identity.org_id,
        branch_id = ?params.branch_id,
        start = %params.window.start_date,
        end = %params.window.end_date,
        total_revenue = dashboard.summary.total_revenue,
        "Dashboard analytics served"
    );

    Ok(Json(dashboard))
}
