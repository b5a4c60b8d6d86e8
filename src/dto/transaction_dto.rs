use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

use crate::model::transaction::{
    Category, DateRange, SortField, SortOrder, Transaction, TransactionChanges, TransactionFilter,
    TransactionSort, TransactionStatus,
};
use crate::util::error::ServiceError;

/// Parses a date query/body parameter, accepting either a full RFC3339
/// timestamp or a bare `YYYY-MM-DD` (taken as midnight UTC).
pub fn parse_date_param(value: &str) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| d.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc())
        .map_err(|_| ServiceError::InvalidInput(format!("Invalid date: {}", value)))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTransactionsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub user_id: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "minAmount")]
    pub min_amount: Option<String>,
    #[serde(rename = "maxAmount")]
    pub max_amount: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

impl ListTransactionsQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(10).max(1)
    }

    /// Rejects on the first malformed field.
    pub fn to_filter(&self) -> Result<TransactionFilter, ServiceError> {
        let mut filter = TransactionFilter {
            search: non_empty(&self.search).map(str::to_string),
            user_id: non_empty(&self.user_id).map(str::to_string),
            ..Default::default()
        };

        if let Some(category) = non_empty(&self.category) {
            filter.category = Some(
                Category::from_str(category).map_err(ServiceError::InvalidInput)?,
            );
        }
        if let Some(status) = non_empty(&self.status) {
            filter.status = Some(
                TransactionStatus::from_str(status).map_err(ServiceError::InvalidInput)?,
            );
        }
        if let Some(start) = non_empty(&self.start_date) {
            filter.date_range.start = Some(parse_date_param(start)?);
        }
        if let Some(end) = non_empty(&self.end_date) {
            filter.date_range.end = Some(parse_date_param(end)?);
        }
        if let Some(min) = non_empty(&self.min_amount) {
            filter.min_amount = Some(
                min.parse::<f64>()
                    .map_err(|_| ServiceError::InvalidInput(format!("Invalid minAmount: {}", min)))?,
            );
        }
        if let Some(max) = non_empty(&self.max_amount) {
            filter.max_amount = Some(
                max.parse::<f64>()
                    .map_err(|_| ServiceError::InvalidInput(format!("Invalid maxAmount: {}", max)))?,
            );
        }
        Ok(filter)
    }

    pub fn to_sort(&self) -> Result<TransactionSort, ServiceError> {
        let mut sort = TransactionSort::default();
        if let Some(field) = non_empty(&self.sort_by) {
            sort.field = SortField::from_str(field).map_err(ServiceError::InvalidInput)?;
        }
        if let Some(order) = non_empty(&self.sort_order) {
            sort.order = SortOrder::from_str(order).map_err(ServiceError::InvalidInput)?;
        }
        Ok(sort)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    pub id: i64,
    pub date: String,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub category: String,
    pub status: String,
    #[validate(length(min = 1))]
    pub user_id: String,
    #[validate(length(min = 1))]
    pub user_profile: String,
}

impl CreateTransactionRequest {
    pub fn to_transaction(&self) -> Result<Transaction, ServiceError> {
        Ok(Transaction {
            object_id: None,
            id: self.id,
            date: bson::DateTime::from_chrono(parse_date_param(&self.date)?),
            amount: self.amount,
            category: Category::from_str(&self.category).map_err(ServiceError::InvalidInput)?,
            status: TransactionStatus::from_str(&self.status).map_err(ServiceError::InvalidInput)?,
            user_id: self.user_id.clone(),
            user_profile: self.user_profile.clone(),
            created_at: None,
            updated_at: None,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTransactionRequest {
    pub date: Option<String>,
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub status: Option<String>,
    #[validate(length(min = 1))]
    pub user_id: Option<String>,
    #[validate(length(min = 1))]
    pub user_profile: Option<String>,
}

impl UpdateTransactionRequest {
    pub fn to_changes(&self) -> Result<TransactionChanges, ServiceError> {
        let mut changes = TransactionChanges {
            amount: self.amount,
            user_id: self.user_id.clone(),
            user_profile: self.user_profile.clone(),
            ..Default::default()
        };
        if let Some(ref date) = self.date {
            changes.date = Some(parse_date_param(date)?);
        }
        if let Some(ref category) = self.category {
            changes.category =
                Some(Category::from_str(category).map_err(ServiceError::InvalidInput)?);
        }
        if let Some(ref status) = self.status {
            changes.status =
                Some(TransactionStatus::from_str(status).map_err(ServiceError::InvalidInput)?);
        }
        Ok(changes)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub date: String,
    pub amount: f64,
    pub category: Category,
    pub status: TransactionStatus,
    pub user_id: String,
    pub user_profile: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Transaction> for TransactionResponse {
    fn from(txn: Transaction) -> Self {
        TransactionResponse {
            id: txn.id,
            date: txn.date.to_chrono().to_rfc3339(),
            amount: txn.amount,
            category: txn.category,
            status: txn.status,
            user_id: txn.user_id,
            user_profile: txn.user_profile,
            created_at: txn.created_at,
            updated_at: txn.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListTransactionsResponse {
    pub transactions: Vec<TransactionResponse>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserIdOption {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterValuesResponse {
    pub categories: Vec<String>,
    pub statuses: Vec<String>,
    #[serde(rename = "userIds")]
    pub user_ids: Vec<UserIdOption>,
}
