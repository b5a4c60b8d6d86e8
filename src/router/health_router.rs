use axum::{routing::get, Router};
use std::sync::Arc;

use crate::handler::health_handler::{api_health_handler, health_handler, HealthState};

pub fn health_router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/health", get(api_health_handler))
        .with_state(state)
}
