//! Organization admin gate
//!
//! The role lookup goes through the organization directory, which in
//! production delegates to the `is_org_admin` database function.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;

use super::UserIdentity;
use crate::error::ServiceError;
use crate::monitoring::{EventKind, SecurityEvent, Severity};
use crate::state::AppState;

/// Middleware: the authenticated user must be an admin of their organization
///
/// Runs after [`super::require_auth`]; 403 `AdminRequired` otherwise.
pub async fn require_org_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<UserIdentity>()
        .cloned()
        .ok_or_else(AppError::not_authenticated)?;

    let is_admin = state
        .directory
        .is_org_admin(&identity.user_id, &identity.org_id)
        .await
        .map_err(ServiceError::from)?;

    if !is_admin {
        state
            .monitor
            .record(
                SecurityEvent::new(
                    EventKind::AdminAccessDenied,
                    Severity::High,
                    "Non-admin user requested an admin-only resource",
                )
                .org(identity.org_id.as_str())
                .subject(identity.user_id.as_str())
                .path(request.uri().path()),
            )
            .await;
        return Err(AppError::admin_required());
    }

    tracing::debug!(
        user_id = %identity.user_id,
        email = %identity.email,
        org_id = %identity.org_id,
        "Admin access granted"
    );
    Ok(next.run(request).await)
}
