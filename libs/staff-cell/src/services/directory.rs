use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{StaffError, StaffRole};

/// The single authorization capability for staff-scoped operations:
/// "caller has a staff-directory record with an accepted role". Every
/// staff handler applies this guard before doing anything else.
pub struct StaffDirectoryService {
    supabase: SupabaseClient,
}

impl StaffDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn require_staff(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<StaffRole, StaffError> {
        debug!("Checking staff directory for user {}", user_id);

        let path = format!("/rest/v1/staff_profiles?user_id=eq.{}&select=role", user_id);

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| StaffError::DatabaseError(e.to_string()))?;

        let Some(row) = result.into_iter().next() else {
            return Err(StaffError::NotStaff);
        };

        // An unrecognized role means no staff access, not a server error.
        serde_json::from_value::<StaffRole>(row["role"].clone()).map_err(|_| StaffError::NotStaff)
    }
}
