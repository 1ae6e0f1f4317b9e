use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use appointment_cell::models::AppointmentStatus;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{RosterEntry, StaffError};

#[derive(Debug, Deserialize)]
struct RosterRow {
    id: Uuid,
    scheduled_start: DateTime<Utc>,
    status: AppointmentStatus,
    queue_number: Option<String>,
    patient: Option<PatientName>,
    doctor: Option<DoctorName>,
}

#[derive(Debug, Deserialize)]
struct PatientName {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct DoctorName {
    name: String,
}

pub struct RosterService {
    supabase: SupabaseClient,
}

impl RosterService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Today's appointments across all doctors, soonest first, with
    /// patient and doctor display names resolved for the counter screen.
    pub async fn today_roster(&self, auth_token: &str) -> Result<Vec<RosterEntry>, StaffError> {
        let settings = self
            .supabase
            .get_clinic_settings(Some(auth_token))
            .await
            .map_err(|e| StaffError::DatabaseError(e.to_string()))?;

        let (day_start, day_end) = settings.clinic_day_bounds(Utc::now());
        debug!("Fetching roster for clinic day starting {}", day_start);

        let path = format!(
            "/rest/v1/appointments?scheduled_start=gte.{}&scheduled_start=lt.{}&select=id,scheduled_start,status,queue_number,patient:patient_profiles(full_name),doctor:doctors(name)&order=scheduled_start.asc",
            urlencoding::encode(&day_start.to_rfc3339()),
            urlencoding::encode(&day_end.to_rfc3339()),
        );

        let rows: Vec<RosterRow> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| StaffError::DatabaseError(e.to_string()))?;

        let entries = rows
            .into_iter()
            .map(|row| RosterEntry {
                id: row.id,
                scheduled_start: row.scheduled_start,
                status: row.status,
                queue_number: row.queue_number,
                patient_full_name: row
                    .patient
                    .map(|p| p.full_name)
                    .unwrap_or_else(|| "Unknown".to_string()),
                doctor_name: row
                    .doctor
                    .map(|d| d.name)
                    .unwrap_or_else(|| "Unknown".to_string()),
            })
            .collect();

        Ok(entries)
    }
}
