use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::Doctor;

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// List active doctors for the public booking page, ordered by name.
    pub async fn list_active_doctors(&self) -> Result<Vec<Doctor>> {
        debug!("Fetching active doctors");

        let path = "/rest/v1/doctors?is_active=eq.true&select=id,name,photo_url,languages,is_active,created_at&order=name.asc";
        let result: Vec<Value> = self.supabase.request(Method::GET, path, None, None).await?;

        let doctors: Vec<Doctor> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Doctor>, _>>()?;

        Ok(doctors)
    }
}
