use anyhow::{anyhow, Result};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{PatientProfile, UpsertProfileRequest};
use crate::services::nric::{hash_nric, mask_nric, normalize_nric, validate_nric};

const PROFILE_COLUMNS: &str =
    "id,user_id,full_name,nric_masked,dob,language,chas_tier,created_at,updated_at";

pub struct ProfileService {
    supabase: SupabaseClient,
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_profile(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Option<PatientProfile>> {
        debug!("Fetching patient profile for user: {}", user_id);

        let path = format!(
            "/rest/v1/patient_profiles?user_id=eq.{}&select={}",
            user_id, PROFILE_COLUMNS
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    /// Create or update the caller's profile. The raw national ID is
    /// consumed here: hashed and masked, then dropped.
    pub async fn upsert_profile(
        &self,
        user_id: &str,
        request: UpsertProfileRequest,
        nric_secret: &str,
        auth_token: &str,
    ) -> Result<PatientProfile> {
        debug!("Upserting patient profile for user: {}", user_id);

        let nric = normalize_nric(&request.nric);
        validate_nric(&nric).map_err(|e| anyhow!(e))?;

        let nric_hash = hash_nric(&nric, nric_secret).map_err(|e| anyhow!(e))?;
        let nric_masked = mask_nric(&nric);

        let profile_data = json!({
            "user_id": user_id,
            "full_name": request.full_name.trim(),
            "nric_hash": nric_hash,
            "nric_masked": nric_masked,
            "dob": request.dob,
            "language": request.language,
            "chas_tier": request.chas_tier,
            "updated_at": Utc::now().to_rfc3339(),
        });

        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );

        let path = format!(
            "/rest/v1/patient_profiles?on_conflict=user_id&select={}",
            PROFILE_COLUMNS
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                &path,
                Some(auth_token),
                Some(profile_data),
                Some(headers),
            )
            .await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Failed to save patient profile - no row returned"))?;

        let profile: PatientProfile = serde_json::from_value(row)?;
        debug!("Patient profile saved with ID: {}", profile.id);

        Ok(profile)
    }
}
