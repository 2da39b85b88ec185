//! Unified error codes for the Lente back office
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Organization / branch errors
//! - 5xxx: Appointment errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the dashboard frontend can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Organization ====================
    /// Branch not found in the caller's organization
    BranchNotFound = 3002,

    // ==================== 5xxx: Appointment ====================
    /// Appointment duration outside the allowed range
    AppointmentInvalidDuration = 5003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::AdminRequired => "Administrator role is required",

            // Organization
            ErrorCode::BranchNotFound => "Branch not found",

            // Appointment
            ErrorCode::AppointmentInvalidDuration => "Appointment duration is out of range",

            // System
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(ErrorCode::ValidationFailed),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            2003 => Ok(ErrorCode::AdminRequired),
            3002 => Ok(ErrorCode::BranchNotFound),
            5003 => Ok(ErrorCode::AppointmentInvalidDuration),
            9001 => Ok(ErrorCode::InternalError),
            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
