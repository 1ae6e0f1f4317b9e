use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::{AuthToken, User};
use shared_models::error::AppError;

use crate::models::UpsertProfileRequest;
use crate::services::nric::{normalize_nric, validate_nric};
use crate::services::profile::ProfileService;

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Extension(token): Extension<AuthToken>,
) -> Result<Json<Value>, AppError> {
    let profile_service = ProfileService::new(&state);

    let profile = profile_service
        .get_profile(&user.id, token.as_str())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({ "profile": profile })))
}

#[axum::debug_handler]
pub async fn upsert_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Extension(token): Extension<AuthToken>,
    Json(request): Json<UpsertProfileRequest>,
) -> Result<Json<Value>, AppError> {
    request.validate().map_err(AppError::ValidationError)?;
    validate_nric(&normalize_nric(&request.nric)).map_err(AppError::ValidationError)?;

    // Refuse outright rather than fall back to a weaker scheme.
    if state.nric_hash_secret.is_empty() {
        return Err(AppError::Configuration(
            "NRIC_HASH_SECRET is not configured".to_string(),
        ));
    }

    let profile_service = ProfileService::new(&state);

    let profile = profile_service
        .upsert_profile(&user.id, request, &state.nric_hash_secret, token.as_str())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({ "profile": profile })))
}
