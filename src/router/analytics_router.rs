use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::handler::analytics_handler::{
    categories_handler, monthly_comparison_handler, summary_handler, trends_handler,
    users_performance_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::analytics_service::AnalyticsServiceImpl;

pub fn analytics_router(service: Arc<AnalyticsServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/analytics/summary", get(summary_handler))
        .route("/analytics/trends", get(trends_handler))
        .route("/analytics/categories", get(categories_handler))
        .route("/analytics/users", get(users_performance_handler))
        .route(
            "/analytics/monthly-comparison",
            get(monthly_comparison_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
