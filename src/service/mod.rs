pub mod analytics_service;
pub mod export_service;
pub mod transaction_service;
pub mod user_service;
