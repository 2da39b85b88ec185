//! Error category classification

use super::codes::ErrorCode;

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Organization / branch errors (3xxx)
    Organization,
    /// Appointment errors (5xxx)
    Appointment,
    /// System errors (9xxx), and any range without a category of its own
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Organization,
            5000..6000 => Self::Appointment,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
