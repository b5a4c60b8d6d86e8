use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::repository::transaction_repo::TransactionRepository;

pub struct HealthState {
    pub config: AppConfig,
    pub store: Arc<dyn TransactionRepository>,
}

/// Process liveness only; never touches the store.
pub async fn health_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.config.environment,
        "port": state.config.port,
    }))
}

/// Liveness plus store connectivity.
pub async fn api_health_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let database = if state.store.ping().await {
        "connected"
    } else {
        "disconnected"
    };
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "environment": state.config.environment,
        "database": database,
        "port": state.config.port,
    }))
}
