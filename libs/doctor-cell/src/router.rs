use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

/// Public routes: the booking page lists doctors and probes slot
/// availability before the patient has signed in.
pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/{doctor_id}/available-slots", get(handlers::get_available_slots))
        .with_state(state)
}
