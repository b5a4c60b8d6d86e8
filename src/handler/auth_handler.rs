use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    Extension,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::dto::auth_dto::{
    AuthUser, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
};
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::error::HandlerError;
use crate::util::policy::{authorize, Capability};

fn validation_error(e: validator::ValidationErrors) -> HandlerError {
    HandlerError::validation(format!("Validation error: {}", e))
}

pub async fn register_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(validation_error)?;
    let res = service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

pub async fn login_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(validation_error)?;
    let res = service.login(payload).await?;
    Ok(Json(res))
}

pub async fn get_profile_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    let profile = service.get_profile(&user.id).await?;
    Ok(Json(json!({ "user": profile })))
}

pub async fn update_profile_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(validation_error)?;
    let profile = service.update_profile(&user.id, payload).await?;
    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": profile,
    })))
}

pub async fn change_password_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    payload.validate().map_err(validation_error)?;
    service.change_password(&user.id, payload).await?;
    Ok(Json(json!({ "message": "Password changed successfully" })))
}

pub async fn list_users_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::ManageUsers)?;
    let users = service.list_users().await?;
    Ok(Json(json!({ "users": users })))
}

pub async fn activity_log_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HandlerError> {
    authorize(user.role, Capability::ViewActivityLog)?;
    let log = service.activity_log().await?;
    Ok(Json(json!({ "activityLog": log })))
}

pub async fn setup_admin_handler(
    State(service): State<Arc<UserServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.setup_admin().await?;
    let status = if res.token.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(res)))
}
