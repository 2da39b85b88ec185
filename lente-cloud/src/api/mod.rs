//! HTTP routes

pub mod analytics;
pub mod appointments;
pub mod health;


use axum::extract::rejection::QueryRejection;
use axum::routing::get;
use axum::{Router, middleware};
use shared::error::{AppError, ErrorCode};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{UserIdentity, require_auth, require_org_admin};
use crate::error::ServiceError;
use crate::monitoring::{EventKind, SecurityEvent, Severity};
use crate::state::AppState;

pub type ApiResult<T> = Result<axum::Json<T>, AppError>;

/// Build the application router with all middleware and state
pub fn create_router(state: AppState) -> Router {
    // Admin only
    let admin = Router::new()
        .route("/api/analytics/dashboard", get(analytics::get_dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_org_admin,
        ));

    // Any authenticated member
    let member = Router::new().route(
        "/api/appointments/availability",
        get(appointments::check_availability),
    );

    Router::new()
        .route("/health", get(health::health_check))
        .merge(admin)
        .merge(member)
        // JWT on every /api/ route, before the admin gate
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Verify that a branch belongs to the caller's organization.
///
/// A foreign or unknown branch is reported as not found.
pub async fn verify_branch(
    state: &AppState,
    identity: &UserIdentity,
    branch_id: i64,
) -> Result<(), AppError> {
    let owned = state
        .directory
        .branch_belongs_to_org(&identity.org_id, branch_id)
        .await
        .map_err(ServiceError::from)?;

    if !owned {
        state
            .monitor
            .record(
                SecurityEvent::new(
                    EventKind::CrossTenantAccess,
                    Severity::Medium,
                    format!("Branch {branch_id} requested outside its organization"),
                )
                .org(identity.org_id.as_str())
                .subject(identity.user_id.as_str()),
            )
            .await;
        return Err(
            AppError::with_message(ErrorCode::BranchNotFound, "Branch not found")
                .with_detail("branchId", branch_id),
        );
    }
    Ok(())
}

/// Malformed query strings render through the error envelope
pub fn query_error(rejection: QueryRejection) -> AppError {
    AppError::with_message(ErrorCode::InvalidRequest, rejection.body_text())
}
