use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use appointment_cell::models::{AppointmentError, AppointmentStatus};
use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Staff,
    Doctor,
    Admin,
}

/// One line of the front-desk roster: today's appointments with display
/// names resolved for the counter screen.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub id: Uuid,
    pub scheduled_start: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub queue_number: Option<String>,
    pub patient_full_name: String,
    pub doctor_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub appointment_id: Uuid,
    pub status: AppointmentStatus,
}

/// Result of a staff status update. `queue_number` carries the assigned
/// number whenever the appointment has one, newly assigned or not.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateOutcome {
    pub status: AppointmentStatus,
    pub queue_number: Option<String>,
    pub newly_assigned: bool,
}

#[derive(Error, Debug)]
pub enum StaffError {
    #[error("Staff access required")]
    NotStaff,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error(transparent)]
    Appointment(#[from] AppointmentError),

    #[error("Failed to assign queue number: {0}")]
    QueueAssignment(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StaffError> for AppError {
    fn from(err: StaffError) -> Self {
        match err {
            StaffError::NotStaff => AppError::Forbidden(err.to_string()),
            StaffError::AppointmentNotFound => AppError::NotFound(err.to_string()),
            StaffError::Appointment(inner) => inner.into(),
            StaffError::QueueAssignment(detail) => AppError::Internal(detail),
            StaffError::DatabaseError(detail) => AppError::Database(detail),
        }
    }
}
