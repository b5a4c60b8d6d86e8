use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

use crate::dto::analytics_dto::DateRangeQuery;
use crate::dto::auth_dto::AuthUser;
use crate::service::analytics_service::{AnalyticsService, AnalyticsServiceImpl};
use crate::util::error::HandlerError;
use crate::util::policy::{authorize, Capability};

pub async fn summary_handler(
    State(service): State<Arc<AnalyticsServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::ViewAnalytics)?;
    let res = service.summary(query.to_range()?).await?;
    Ok(Json(res))
}

pub async fn trends_handler(
    State(service): State<Arc<AnalyticsServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::ViewAnalytics)?;
    let res = service.trends(query.to_range()?).await?;
    Ok(Json(res))
}

pub async fn categories_handler(
    State(service): State<Arc<AnalyticsServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::ViewAnalytics)?;
    let res = service.categories(query.to_range()?).await?;
    Ok(Json(res))
}

pub async fn users_performance_handler(
    State(service): State<Arc<AnalyticsServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::ViewAnalytics)?;
    let res = service.user_performance(query.to_range()?).await?;
    Ok(Json(res))
}

pub async fn monthly_comparison_handler(
    State(service): State<Arc<AnalyticsServiceImpl>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::ViewAnalytics)?;
    let res = service.monthly_comparison().await?;
    Ok(Json(res))
}
