use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dto::transaction_dto::parse_date_param;
use crate::model::transaction::DateRange;
use crate::repository::transaction_repo::{CategoryTotalRow, UserPerformanceRow};
use crate::util::error::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRangeQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    pub fn to_range(&self) -> Result<DateRange, ServiceError> {
        let mut range = DateRange::default();
        if let Some(start) = self.start_date.as_deref().filter(|s| !s.is_empty()) {
            range.start = Some(parse_date_param(start)?);
        }
        if let Some(end) = self.end_date.as_deref().filter(|s| !s.is_empty()) {
            range.end = Some(parse_date_param(end)?);
        }
        Ok(range)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTotals {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_income: f64,
    pub revenue_count: i64,
    pub expense_count: i64,
    pub total_transactions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusBucket {
    pub count: i64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub summary: SummaryTotals,
    pub status_breakdown: BTreeMap<String, StatusBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub period: String,
    pub revenue: f64,
    pub expense: f64,
    pub net_income: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendsResponse {
    pub trends: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryTotalRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersPerformanceResponse {
    pub users: Vec<UserPerformanceRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub period: String,
    pub revenue: f64,
    pub expense: f64,
    pub net_income: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyComparisonResponse {
    pub comparison: Vec<MonthlyPoint>,
}
