use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::debug;

use crate::dto::auth_dto::AuthUser;
use crate::repository::user_repo::UserRepository;
use crate::util::error::{HandlerError, ServiceError};
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};

pub struct AuthState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub user_repo: Arc<dyn UserRepository>,
}

/// Bearer-token authentication for protected routes.
///
/// A missing or unreadable Authorization header is 401; a token that fails
/// verification, has expired, or references a vanished user is 403. Role
/// checks happen in the handlers via `policy::authorize`, not here.
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HandlerError::unauthorized("Access token required"))?;

    let token = state
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|_| HandlerError::unauthorized("Access token required"))?;

    let claims = state.jwt_utils.validate_token(&token).map_err(|e| {
        debug!("Token rejected: {}", e);
        HandlerError::forbidden("Invalid token")
    })?;

    let user_id = ObjectId::parse_str(&claims.sub)
        .map_err(|_| HandlerError::forbidden("Invalid token"))?;
    let user = state
        .user_repo
        .find_by_id(&user_id)
        .await
        .map_err(|e| HandlerError::from(ServiceError::from(e)))?
        .ok_or_else(|| HandlerError::forbidden("Invalid token"))?;

    req.extensions_mut().insert(AuthUser::from(&user));
    Ok(next.run(req).await)
}
