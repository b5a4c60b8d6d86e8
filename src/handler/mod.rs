pub mod analytics_handler;
pub mod auth_handler;
pub mod export_handler;
pub mod health_handler;
pub mod transaction_handler;
