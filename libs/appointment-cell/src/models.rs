use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Booked,
    Arrived,
    InConsultation,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Arrived => "arrived",
            AppointmentStatus::InConsultation => "in_consultation",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::NoShow => "no_show",
        }
    }

    /// Statuses that keep their slot occupied and count as an active claim
    /// on the doctor's time.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Booked
                | AppointmentStatus::Arrived
                | AppointmentStatus::InConsultation
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::NoShow)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub scheduled_start: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub queue_number: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub scheduled_start: DateTime<Utc>,
    pub reason: Option<String>,
}

impl BookAppointmentRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(reason) = &self.reason {
            if reason.len() > 500 {
                return Err("Reason is too long".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("That timeslot has just been taken, please pick another")]
    SlotTaken,

    #[error("Please complete your profile before booking")]
    ProfileMissing,

    #[error("This doctor is not accepting bookings")]
    DoctorUnavailable,

    #[error("Cannot move appointment from {0} to {1}")]
    InvalidStatusTransition(AppointmentStatus, AppointmentStatus),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound => AppError::NotFound(err.to_string()),
            AppointmentError::SlotTaken => AppError::Conflict(err.to_string()),
            AppointmentError::ProfileMissing | AppointmentError::DoctorUnavailable => {
                AppError::BadRequest(err.to_string())
            }
            AppointmentError::InvalidStatusTransition(_, _) => {
                AppError::ValidationError(err.to_string())
            }
            AppointmentError::DatabaseError(detail) => AppError::Database(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_to_snake_case() {
        assert_eq!(
            serde_json::to_value(AppointmentStatus::InConsultation).unwrap(),
            serde_json::json!("in_consultation")
        );
        assert_eq!(
            serde_json::from_value::<AppointmentStatus>(serde_json::json!("no_show")).unwrap(),
            AppointmentStatus::NoShow
        );
    }

    #[test]
    fn terminal_statuses_are_not_active() {
        for status in [AppointmentStatus::Completed, AppointmentStatus::NoShow] {
            assert!(status.is_terminal());
            assert!(!status.is_active());
        }
    }
}
