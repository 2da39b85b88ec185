//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::ValueOutOfRange
            | Self::AppointmentInvalidDuration => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::AdminRequired => StatusCode::FORBIDDEN,

            // 404 Not Found (also a branch of another organization)
            Self::BranchNotFound => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
