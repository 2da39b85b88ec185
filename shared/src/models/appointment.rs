//! Appointment Model (eye exams, fittings, pickups)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "appointment_status", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

/// Appointment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Appointment {
    pub id: i64,
    pub org_id: String,
    pub branch_id: i64,
    pub customer_id: Option<i64>,
    pub status: AppointmentStatus,
    /// Unix millis of the slot start
    pub scheduled_at: i64,
    pub duration_minutes: i32,
    /// Unix millis
    pub created_at: i64,
}

/// Result of the availability check for a prospective slot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub available: bool,
    pub branch_id: i64,
    pub starts_at: i64,
    pub ends_at: i64,
    /// Number of existing appointments overlapping the slot
    pub conflicts: i64,
}
