use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::StaffError;

#[derive(Debug, Deserialize)]
struct QueueRow {
    queue_number: Option<String>,
}

/// Per-doctor, per-clinic-day queue sequencing. Numbers are labels like
/// "A001"; the numeric suffix increases monotonically within the day.
pub struct QueueNumberService {
    supabase: Arc<SupabaseClient>,
}

impl QueueNumberService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Next number for the doctor's day containing `scheduled_start`:
    /// highest numeric suffix already handed out, plus one.
    pub async fn next_queue_number(
        &self,
        doctor_id: Uuid,
        scheduled_start: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<String, StaffError> {
        let settings = self
            .supabase
            .get_clinic_settings(Some(auth_token))
            .await
            .map_err(|e| StaffError::QueueAssignment(e.to_string()))?;

        let (day_start, day_end) = settings.clinic_day_bounds(scheduled_start);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&scheduled_start=gte.{}&scheduled_start=lt.{}&queue_number=not.is.null&select=queue_number",
            doctor_id,
            urlencoding::encode(&day_start.to_rfc3339()),
            urlencoding::encode(&day_end.to_rfc3339()),
        );

        let rows: Vec<QueueRow> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| StaffError::QueueAssignment(e.to_string()))?;

        let highest = rows
            .iter()
            .filter_map(|row| row.queue_number.as_deref())
            .map(parse_queue_suffix)
            .max()
            .unwrap_or(0);

        let next = format_queue_number(highest + 1);
        debug!(
            "Next queue number for doctor {} on {} is {}",
            doctor_id,
            day_start.date_naive(),
            next
        );

        Ok(next)
    }

    /// Claim a queue number for an appointment arriving now. The update is
    /// filtered on `queue_number=is.null`, so of two concurrent arrivals
    /// exactly one writes; the loser re-reads the winner's number. Returns
    /// the number and whether this call assigned it.
    pub async fn claim_queue_number(
        &self,
        appointment_id: Uuid,
        candidate: &str,
        auth_token: &str,
    ) -> Result<(String, bool), StaffError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&queue_number=is.null&select=queue_number",
            appointment_id
        );

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let body = serde_json::json!({
            "queue_number": candidate,
            "status": "arrived",
            "updated_at": Utc::now().to_rfc3339(),
        });

        let updated: Vec<QueueRow> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(auth_token), Some(body), Some(headers))
            .await
            .map_err(|e| StaffError::QueueAssignment(e.to_string()))?;

        if !updated.is_empty() {
            info!("Assigned queue number {} to appointment {}", candidate, appointment_id);
            return Ok((candidate.to_string(), true));
        }

        // Another front-desk request got there first; surface its number.
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&select=queue_number",
            appointment_id
        );
        let rows: Vec<QueueRow> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| StaffError::QueueAssignment(e.to_string()))?;

        let existing = rows
            .into_iter()
            .next()
            .and_then(|row| row.queue_number)
            .ok_or_else(|| {
                StaffError::QueueAssignment(
                    "Guarded update matched nothing and no queue number exists".to_string(),
                )
            })?;

        Ok((existing, false))
    }
}

/// Numeric suffix of a queue label: strip every non-digit and parse.
/// Unparseable labels count as zero so one bad row cannot wedge the day.
pub fn parse_queue_suffix(queue_number: &str) -> i32 {
    let digits: String = queue_number.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

pub fn format_queue_number(n: i32) -> String {
    format!("A{:03}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_parsing_strips_the_letter_prefix() {
        assert_eq!(parse_queue_suffix("A001"), 1);
        assert_eq!(parse_queue_suffix("A042"), 42);
        assert_eq!(parse_queue_suffix("A999"), 999);
    }

    #[test]
    fn suffix_parsing_tolerates_garbage() {
        assert_eq!(parse_queue_suffix(""), 0);
        assert_eq!(parse_queue_suffix("walk-in"), 0);
        assert_eq!(parse_queue_suffix("B-07"), 7);
    }

    #[test]
    fn formatting_zero_pads_to_three_digits() {
        assert_eq!(format_queue_number(1), "A001");
        assert_eq!(format_queue_number(42), "A042");
        assert_eq!(format_queue_number(1000), "A1000");
    }
}
