use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn staff_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/appointments", get(handlers::today_appointments))
        .route("/appointment-status", post(handlers::update_appointment_status))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
