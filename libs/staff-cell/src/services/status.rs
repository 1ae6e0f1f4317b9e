use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use appointment_cell::models::{Appointment, AppointmentStatus};
use appointment_cell::services::lifecycle::AppointmentLifecycleService;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{StaffError, StatusUpdateOutcome};
use crate::services::queue::QueueNumberService;

const APPOINTMENT_COLUMNS: &str =
    "id,patient_id,doctor_id,scheduled_start,status,queue_number,reason,created_at,updated_at";

/// Advances an appointment through its lifecycle on behalf of the front
/// desk. The first transition into `arrived` also claims a queue number.
pub struct StatusUpdateService {
    supabase: Arc<SupabaseClient>,
    lifecycle: AppointmentLifecycleService,
    queue: QueueNumberService,
}

impl StatusUpdateService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let queue = QueueNumberService::new(Arc::clone(&supabase));

        Self {
            supabase,
            lifecycle: AppointmentLifecycleService::new(),
            queue,
        }
    }

    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<StatusUpdateOutcome, StaffError> {
        let appointment = self.get_appointment(appointment_id, auth_token).await?;

        // Re-marking an arrived appointment as arrived is a no-op that
        // reports the number already on the board.
        if new_status == AppointmentStatus::Arrived
            && appointment.status == AppointmentStatus::Arrived
            && appointment.queue_number.is_some()
        {
            debug!("Appointment {} already arrived, returning existing number", appointment_id);
            return Ok(StatusUpdateOutcome {
                status: AppointmentStatus::Arrived,
                queue_number: appointment.queue_number,
                newly_assigned: false,
            });
        }

        self.lifecycle
            .validate_status_transition(appointment.status, new_status)?;

        if new_status == AppointmentStatus::Arrived && appointment.queue_number.is_none() {
            let candidate = self
                .queue
                .next_queue_number(appointment.doctor_id, appointment.scheduled_start, auth_token)
                .await?;

            let (queue_number, newly_assigned) = self
                .queue
                .claim_queue_number(appointment_id, &candidate, auth_token)
                .await?;

            return Ok(StatusUpdateOutcome {
                status: AppointmentStatus::Arrived,
                queue_number: Some(queue_number),
                newly_assigned,
            });
        }

        self.write_status(appointment_id, new_status, auth_token).await?;

        info!("Appointment {} moved to {}", appointment_id, new_status);
        Ok(StatusUpdateOutcome {
            status: new_status,
            queue_number: appointment.queue_number,
            newly_assigned: false,
        })
    }

    async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, StaffError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&select={}",
            appointment_id, APPOINTMENT_COLUMNS
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| StaffError::DatabaseError(e.to_string()))?;

        let Some(row) = result.into_iter().next() else {
            return Err(StaffError::AppointmentNotFound);
        };

        serde_json::from_value(row)
            .map_err(|e| StaffError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    async fn write_status(
        &self,
        appointment_id: Uuid,
        new_status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<(), StaffError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=minimal"),
        );

        let body = json!({
            "status": new_status,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let _: Option<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(auth_token), Some(body), Some(headers))
            .await
            .map_err(|e| StaffError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
