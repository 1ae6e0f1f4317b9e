use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::SlotsQuery;
use crate::services::{availability::AvailabilityService, doctor::DoctorService};

#[axum::debug_handler]
pub async fn list_doctors(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctors = doctor_service
        .list_active_doctors()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = Uuid::parse_str(&doctor_id)
        .map_err(|_| AppError::BadRequest("Invalid doctor id".to_string()))?;

    let availability_service = AvailabilityService::new(&state);

    let slots = availability_service
        .get_available_slots(&doctor_id.to_string(), query.date)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "available_slots": slots,
        "doctor_id": doctor_id,
        "date": query.date,
        "total_slots": slots.len()
    })))
}
