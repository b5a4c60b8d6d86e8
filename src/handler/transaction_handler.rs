use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::dto::auth_dto::AuthUser;
use crate::dto::transaction_dto::{
    CreateTransactionRequest, ListTransactionsQuery, UpdateTransactionRequest,
};
use crate::service::transaction_service::{TransactionService, TransactionServiceImpl};
use crate::util::error::HandlerError;
use crate::util::policy::{authorize, Capability};

pub async fn list_transactions_handler(
    State(service): State<Arc<TransactionServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::ViewTransactions)?;
    let res = service.list(query).await?;
    Ok(Json(res))
}

pub async fn get_transaction_handler(
    State(service): State<Arc<TransactionServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::ViewTransactions)?;
    let transaction = service.get(id).await?;
    Ok(Json(json!({ "transaction": transaction })))
}

pub async fn create_transaction_handler(
    State(service): State<Arc<TransactionServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::EditTransactions)?;
    payload
        .validate()
        .map_err(|e| HandlerError::validation(format!("Validation error: {}", e)))?;
    let transaction = service.create(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "transaction": transaction }))))
}

pub async fn update_transaction_handler(
    State(service): State<Arc<TransactionServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::EditTransactions)?;
    payload
        .validate()
        .map_err(|e| HandlerError::validation(format!("Validation error: {}", e)))?;
    let transaction = service.update(&user, id, payload).await?;
    Ok(Json(json!({ "transaction": transaction })))
}

pub async fn delete_transaction_handler(
    State(service): State<Arc<TransactionServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::DeleteTransactions)?;
    service.delete(&user, id).await?;
    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}

pub async fn filter_values_handler(
    State(service): State<Arc<TransactionServiceImpl>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::ViewTransactions)?;
    let values = service.filter_values().await?;
    Ok(Json(values))
}
