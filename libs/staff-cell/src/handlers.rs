use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{AuthToken, User};
use shared_models::error::AppError;

use crate::models::UpdateStatusRequest;
use crate::services::directory::StaffDirectoryService;
use crate::services::roster::RosterService;
use crate::services::status::StatusUpdateService;

#[axum::debug_handler]
pub async fn today_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Extension(token): Extension<AuthToken>,
) -> Result<Json<Value>, AppError> {
    let directory = StaffDirectoryService::new(&state);
    directory
        .require_staff(&user.id, token.as_str())
        .await
        .map_err(AppError::from)?;

    let roster_service = RosterService::new(&state);

    let appointments = roster_service
        .today_roster(token.as_str())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "appointments": appointments })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Extension(token): Extension<AuthToken>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let directory = StaffDirectoryService::new(&state);
    directory
        .require_staff(&user.id, token.as_str())
        .await
        .map_err(AppError::from)?;

    let status_service = StatusUpdateService::new(&state);

    let outcome = status_service
        .update_status(request.appointment_id, request.status, token.as_str())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "status": outcome.status,
        "queue_number": outcome.queue_number,
        "newly_assigned": outcome.newly_assigned
    })))
}
