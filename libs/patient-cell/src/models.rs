use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subsidy-tier classification used for local billing context. Opaque to
/// this backend beyond storage and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChasTier {
    Blue,
    Orange,
    Green,
    None,
    Unknown,
}

impl Default for ChasTier {
    fn default() -> Self {
        ChasTier::Unknown
    }
}

/// Masked view of a patient profile. The raw national ID never appears
/// here; only the keyed hash (not selected) and the masked form persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub nric_masked: String,
    pub dob: NaiveDate,
    pub language: String,
    pub chas_tier: ChasTier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub full_name: String,
    pub nric: String,
    pub dob: NaiveDate,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub chas_tier: ChasTier,
}

fn default_language() -> String {
    "en".to_string()
}

impl UpsertProfileRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.full_name.trim().is_empty() {
            return Err("Full name is required".to_string());
        }
        if self.full_name.len() > 200 {
            return Err("Full name is too long".to_string());
        }
        if self.language.is_empty() || self.language.len() > 16 {
            return Err("Language must be between 1 and 16 characters".to_string());
        }
        Ok(())
    }
}
