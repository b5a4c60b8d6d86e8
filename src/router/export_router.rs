use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::export_handler::{
    export_analytics_csv_handler, export_columns_handler, export_csv_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::export_service::ExportServiceImpl;

pub fn export_router(service: Arc<ExportServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/export/columns", get(export_columns_handler))
        .route("/export/csv", post(export_csv_handler))
        .route("/export/analytics-csv", post(export_analytics_csv_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
