use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::dto::transaction_dto::parse_date_param;
use crate::model::transaction::{Category, TransactionFilter, TransactionStatus};
use crate::util::error::ServiceError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportColumn {
    pub field: &'static str,
    pub header_name: &'static str,
    #[serde(rename = "type")]
    pub column_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportColumnsResponse {
    pub columns: Vec<ExportColumn>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportFilters {
    pub category: Option<String>,
    pub status: Option<String>,
    pub user_id: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "minAmount")]
    pub min_amount: Option<f64>,
    #[serde(rename = "maxAmount")]
    pub max_amount: Option<f64>,
}

impl ExportFilters {
    pub fn to_filter(&self) -> Result<TransactionFilter, ServiceError> {
        let mut filter = TransactionFilter {
            user_id: self.user_id.clone().filter(|s| !s.is_empty()),
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            ..Default::default()
        };
        if let Some(category) = self.category.as_deref().filter(|s| !s.is_empty()) {
            filter.category =
                Some(Category::from_str(category).map_err(ServiceError::InvalidInput)?);
        }
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            filter.status =
                Some(TransactionStatus::from_str(status).map_err(ServiceError::InvalidInput)?);
        }
        if let Some(start) = self.start_date.as_deref().filter(|s| !s.is_empty()) {
            filter.date_range.start = Some(parse_date_param(start)?);
        }
        if let Some(end) = self.end_date.as_deref().filter(|s| !s.is_empty()) {
            filter.date_range.end = Some(parse_date_param(end)?);
        }
        Ok(filter)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportTransactionsRequest {
    #[serde(rename = "selectedColumns")]
    pub selected_columns: Vec<String>,
    #[serde(default)]
    pub filters: ExportFilters,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportAnalyticsRequest {
    #[serde(default)]
    pub filters: ExportFilters,
}
