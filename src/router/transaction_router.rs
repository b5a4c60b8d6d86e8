use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::handler::transaction_handler::{
    create_transaction_handler, delete_transaction_handler, filter_values_handler,
    get_transaction_handler, list_transactions_handler, update_transaction_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::transaction_service::TransactionServiceImpl;

pub fn transaction_router(
    service: Arc<TransactionServiceImpl>,
    auth_state: Arc<AuthState>,
) -> Router {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions_handler).post(create_transaction_handler),
        )
        .route("/transactions/filters/values", get(filter_values_handler))
        .route(
            "/transactions/{id}",
            get(get_transaction_handler)
                .put(update_transaction_handler)
                .delete(delete_transaction_handler),
        )
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(service)
}
