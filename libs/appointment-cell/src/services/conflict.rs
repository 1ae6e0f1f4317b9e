use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::AppointmentError;

/// Statuses that hold a claim on a slot. Mirrors
/// `AppointmentStatus::is_active`, spelled as a PostgREST filter.
const ACTIVE_STATUSES: &str = "in.(booked,arrived,in_consultation)";

pub struct ConflictService {
    supabase: Arc<SupabaseClient>,
}

impl ConflictService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Check whether an active appointment already occupies the exact
    /// (doctor, instant) pair. Read-then-act: the database uniqueness
    /// constraint is the backstop for the race window, see
    /// `is_unique_violation`.
    pub async fn is_slot_taken(
        &self,
        doctor_id: Uuid,
        scheduled_start: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<bool, AppointmentError> {
        debug!(
            "Checking slot conflict for doctor {} at {}",
            doctor_id, scheduled_start
        );

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&scheduled_start=eq.{}&status={}&select=id&limit=1",
            doctor_id,
            urlencoding::encode(&scheduled_start.to_rfc3339()),
            ACTIVE_STATUSES,
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if !result.is_empty() {
            warn!(
                "Slot conflict for doctor {} at {}",
                doctor_id, scheduled_start
            );
        }

        Ok(!result.is_empty())
    }
}

/// Postgres signals a lost insert race on the (doctor_id, scheduled_start)
/// uniqueness constraint with SQLSTATE 23505.
pub fn is_unique_violation(message: &str) -> bool {
    message.contains("23505") || message.contains("duplicate key")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_postgres_unique_violations() {
        assert!(is_unique_violation(
            r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#
        ));
        assert!(is_unique_violation("duplicate key value"));
        assert!(!is_unique_violation("permission denied for table appointments"));
    }
}
