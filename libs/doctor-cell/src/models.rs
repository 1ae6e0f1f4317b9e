use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub photo_url: Option<String>,
    pub languages: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One bookable start time for a doctor. `starts_at` is the canonical UTC
/// instant; `label` is the clinic-local wall time shown to patients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub starts_at: DateTime<Utc>,
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}
