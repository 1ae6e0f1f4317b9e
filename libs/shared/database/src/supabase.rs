use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_models::clinic::ClinicSettings;

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Anonymous requests still authenticate with the anon key so RLS
        // policies for public reads apply.
        let bearer = auth_token.unwrap_or(&self.anon_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer)).unwrap(),
        );

        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, auth_token, body, None)
            .await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token);
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                409 => anyhow!("Conflict: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        // DELETE and return=minimal responses have empty bodies.
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            let data = serde_json::from_slice::<T>(b"null")
                .map_err(|_| anyhow!("Expected a response body but got none"))?;
            return Ok(data);
        }

        let data = serde_json::from_slice::<T>(&bytes)?;
        Ok(data)
    }

    /// Load the clinic settings singleton. A missing row is a configuration
    /// error, never an implicit default.
    pub async fn get_clinic_settings(&self, auth_token: Option<&str>) -> Result<ClinicSettings> {
        let path = "/rest/v1/clinic_settings?select=slot_duration_min,booking_window_days,utc_offset_minutes&limit=1";

        let result: Vec<Value> = self.request(Method::GET, path, auth_token, None).await?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("clinic_settings row is missing - configure the clinic before serving"))?;

        let settings: ClinicSettings = serde_json::from_value(row)?;
        Ok(settings)
    }
}
