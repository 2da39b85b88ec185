//! Service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`BoxError`) and the
//! API-layer `AppError`, so handlers can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::db::BoxError;

#[derive(Debug)]
pub enum ServiceError {
    /// Database or infrastructure error, logged and mapped to InternalError
    Db(BoxError),
    /// Business-rule error, passed through to the client
    App(AppError),
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
