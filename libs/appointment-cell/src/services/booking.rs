use std::sync::Arc;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, BookAppointmentRequest};
use crate::services::conflict::{is_unique_violation, ConflictService};

const APPOINTMENT_COLUMNS: &str =
    "id,patient_id,doctor_id,scheduled_start,status,queue_number,reason,created_at,updated_at";

pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    conflict_service: ConflictService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let conflict_service = ConflictService::new(Arc::clone(&supabase));

        Self {
            supabase,
            conflict_service,
        }
    }

    /// Book a slot for the calling patient. The appointment starts life as
    /// `booked`; the queue number comes later, at the front desk.
    pub async fn book_appointment(
        &self,
        user_id: &str,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for user {} with doctor {}",
            user_id, request.doctor_id
        );

        let patient_id = self
            .resolve_patient_id(user_id, auth_token)
            .await?
            .ok_or(AppointmentError::ProfileMissing)?;

        self.verify_doctor_bookable(request.doctor_id, auth_token).await?;

        if self
            .conflict_service
            .is_slot_taken(request.doctor_id, request.scheduled_start, auth_token)
            .await?
        {
            return Err(AppointmentError::SlotTaken);
        }

        let appointment_data = json!({
            "patient_id": patient_id,
            "doctor_id": request.doctor_id,
            "scheduled_start": request.scheduled_start.to_rfc3339(),
            "status": "booked",
            "reason": request.reason,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339(),
        });

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let path = format!("/rest/v1/appointments?select={}", APPOINTMENT_COLUMNS);

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                &path,
                Some(auth_token),
                Some(appointment_data),
                Some(headers),
            )
            .await
            .map_err(|e| {
                let message = e.to_string();
                if is_unique_violation(&message) {
                    // Lost the race between the pre-check and the insert.
                    warn!(
                        "Insert race lost for doctor {} at {}",
                        request.doctor_id, request.scheduled_start
                    );
                    AppointmentError::SlotTaken
                } else {
                    AppointmentError::DatabaseError(message)
                }
            })?;

        let row = result.into_iter().next().ok_or_else(|| {
            AppointmentError::DatabaseError("Insert returned no appointment row".to_string())
        })?;

        let appointment: Appointment = serde_json::from_value(row)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        info!("Appointment {} booked successfully", appointment.id);
        Ok(appointment)
    }

    /// All appointments belonging to the calling patient, soonest first.
    /// A user without a profile has nothing booked: empty list, not an
    /// error.
    pub async fn my_appointments(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Fetching appointments for user {}", user_id);

        let Some(patient_id) = self.resolve_patient_id(user_id, auth_token).await? else {
            return Ok(vec![]);
        };

        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&select={}&order=scheduled_start.asc",
            patient_id, APPOINTMENT_COLUMNS
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointments: Vec<Appointment> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))?;

        Ok(appointments)
    }

    async fn resolve_patient_id(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Option<Uuid>, AppointmentError> {
        let path = format!("/rest/v1/patient_profiles?user_id=eq.{}&select=id", user_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let Some(row) = result.into_iter().next() else {
            return Ok(None);
        };

        let id = row["id"]
            .as_str()
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| {
                AppointmentError::DatabaseError("patient_profiles.id is not a uuid".to_string())
            })?;

        Ok(Some(id))
    }

    async fn verify_doctor_bookable(
        &self,
        doctor_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/doctors?id=eq.{}&select=id,is_active", doctor_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let active = result
            .first()
            .map(|row| row["is_active"].as_bool().unwrap_or(false))
            .unwrap_or(false);

        if !active {
            return Err(AppointmentError::DoctorUnavailable);
        }

        Ok(())
    }
}
