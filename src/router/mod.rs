pub mod analytics_router;
pub mod auth_router;
pub mod export_router;
pub mod health_router;
pub mod transaction_router;
