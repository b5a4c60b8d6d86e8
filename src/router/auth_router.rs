use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::auth_handler::{
    activity_log_handler, change_password_handler, get_profile_handler, list_users_handler,
    login_handler, register_handler, setup_admin_handler, update_profile_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::user_service::UserServiceImpl;

pub fn auth_router(service: Arc<UserServiceImpl>, auth_state: Arc<AuthState>) -> Router {
    // Public routes
    let public = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/setup-admin", post(setup_admin_handler));

    // Token-protected routes; role checks live in the handlers
    let protected = Router::new()
        .route(
            "/auth/profile",
            get(get_profile_handler).put(update_profile_handler),
        )
        .route("/auth/change-password", put(change_password_handler))
        .route("/auth/users", get(list_users_handler))
        .route("/auth/activity-log", get(activity_log_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public.merge(protected).with_state(service)
}
