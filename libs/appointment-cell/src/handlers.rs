use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{AuthToken, User};
use shared_models::error::AppError;

use crate::models::BookAppointmentRequest;
use crate::services::booking::BookingService;

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Extension(token): Extension<AuthToken>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    request.validate().map_err(AppError::ValidationError)?;

    let booking_service = BookingService::new(&state);

    let appointment = booking_service
        .book_appointment(&user.id, request, token.as_str())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn my_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Extension(token): Extension<AuthToken>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state);

    let appointments = booking_service
        .my_appointments(&user.id, token.as_str())
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "appointments": appointments })))
}
