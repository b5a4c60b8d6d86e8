pub mod analytics_dto;
pub mod auth_dto;
pub mod export_dto;
pub mod transaction_dto;
