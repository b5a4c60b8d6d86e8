use axum::{
    body::Body,
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use std::sync::Arc;

use crate::dto::auth_dto::AuthUser;
use crate::dto::export_dto::{
    ExportAnalyticsRequest, ExportColumnsResponse, ExportTransactionsRequest,
};
use crate::service::export_service::{CsvExport, ExportService, ExportServiceImpl};
use crate::util::error::{HandlerError, HandlerErrorKind};
use crate::util::policy::{authorize, Capability};

fn csv_response(export: CsvExport) -> Result<Response, HandlerError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", export.filename),
        )
        .body(Body::from(export.content))
        .map_err(|e| {
            HandlerError::new(
                HandlerErrorKind::Internal,
                format!("Failed to build CSV response: {}", e),
            )
        })
}

pub async fn export_columns_handler(
    State(service): State<Arc<ExportServiceImpl>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::ExportData)?;
    Ok(axum::Json(ExportColumnsResponse {
        columns: service.columns(),
    }))
}

pub async fn export_csv_handler(
    State(service): State<Arc<ExportServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ExportTransactionsRequest>,
) -> Result<Response, HandlerError> {
    authorize(user.role, Capability::ExportData)?;
    let export = service.export_transactions(&user, payload).await?;
    csv_response(export)
}

pub async fn export_analytics_csv_handler(
    State(service): State<Arc<ExportServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ExportAnalyticsRequest>,
) -> Result<Response, HandlerError> {
    authorize(user.role, Capability::ExportData)?;
    let export = service.export_analytics(&user, payload).await?;
    csv_response(export)
}
