use async_trait::async_trait;
use chrono::{Datelike, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;

use crate::dto::analytics_dto::{
    CategoriesResponse, MonthlyComparisonResponse, MonthlyPoint, StatusBucket, SummaryResponse,
    SummaryTotals, TrendPoint, TrendsResponse, UsersPerformanceResponse,
};
use crate::model::transaction::{Category, DateRange, TransactionFilter};
use crate::repository::transaction_repo::{
    CategoryTotalRow, MonthlyCategoryRow, StatusBreakdownRow, TransactionRepository,
};
use crate::util::error::ServiceError;

#[async_trait]
pub trait AnalyticsService: Send + Sync {
    async fn summary(&self, range: DateRange) -> Result<SummaryResponse, ServiceError>;
    async fn trends(&self, range: DateRange) -> Result<TrendsResponse, ServiceError>;
    async fn categories(&self, range: DateRange) -> Result<CategoriesResponse, ServiceError>;
    async fn user_performance(
        &self,
        range: DateRange,
    ) -> Result<UsersPerformanceResponse, ServiceError>;
    async fn monthly_comparison(&self) -> Result<MonthlyComparisonResponse, ServiceError>;
}

pub struct AnalyticsServiceImpl {
    pub txn_repo: Arc<dyn TransactionRepository>,
}

impl AnalyticsServiceImpl {
    pub fn new(txn_repo: Arc<dyn TransactionRepository>) -> Self {
        Self { txn_repo }
    }
}

/// Folds per-category totals, the status buckets and the overall count into
/// the dashboard summary. Categories absent from the range contribute zero.
pub(crate) fn build_summary(
    categories: &[CategoryTotalRow],
    statuses: &[StatusBreakdownRow],
    total_transactions: u64,
) -> SummaryResponse {
    let mut totals = SummaryTotals {
        total_transactions,
        ..Default::default()
    };
    for row in categories {
        match row.category {
            Category::Revenue => {
                totals.total_revenue = row.total;
                totals.revenue_count = row.count;
            }
            Category::Expense => {
                totals.total_expenses = row.total;
                totals.expense_count = row.count;
            }
        }
    }
    totals.net_income = totals.total_revenue - totals.total_expenses;

    let status_breakdown = statuses
        .iter()
        .map(|row| {
            (
                row.status.as_str().to_string(),
                StatusBucket {
                    count: row.count,
                    total: row.total,
                },
            )
        })
        .collect();

    SummaryResponse {
        summary: totals,
        status_breakdown,
    }
}

/// Merges (year, month, category) buckets into chronological trend points.
/// A month that only saw one category reports 0 for the other.
pub(crate) fn build_trend_points(rows: &[MonthlyCategoryRow]) -> Vec<TrendPoint> {
    build_trend_points_keyed(rows)
        .into_iter()
        .map(|(_, point)| point)
        .collect()
}

pub(crate) fn build_monthly_points(rows: &[MonthlyCategoryRow]) -> Vec<MonthlyPoint> {
    build_trend_points_keyed(rows)
        .into_iter()
        .map(|((year, month), point)| MonthlyPoint {
            year,
            month,
            period: point.period,
            revenue: point.revenue,
            expense: point.expense,
            net_income: point.net_income,
        })
        .collect()
}

fn build_trend_points_keyed(rows: &[MonthlyCategoryRow]) -> Vec<((i32, u32), TrendPoint)> {
    let mut months: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for row in rows {
        let entry = months.entry((row.key.year, row.key.month)).or_default();
        match row.key.category {
            Category::Revenue => entry.0 += row.total,
            Category::Expense => entry.1 += row.total,
        }
    }
    months
        .into_iter()
        .map(|((year, month), (revenue, expense))| {
            (
                (year, month),
                TrendPoint {
                    period: format!("{}-{:02}", year, month),
                    revenue,
                    expense,
                    net_income: revenue - expense,
                },
            )
        })
        .collect()
}

#[async_trait]
impl AnalyticsService for AnalyticsServiceImpl {
    #[instrument(skip(self))]
    async fn summary(&self, range: DateRange) -> Result<SummaryResponse, ServiceError> {
        let categories = self.txn_repo.category_totals(range).await?;
        let statuses = self.txn_repo.status_breakdown(range).await?;
        let filter = TransactionFilter {
            date_range: range,
            ..Default::default()
        };
        let total = self.txn_repo.count(&filter).await?;
        Ok(build_summary(&categories, &statuses, total))
    }

    #[instrument(skip(self))]
    async fn trends(&self, range: DateRange) -> Result<TrendsResponse, ServiceError> {
        let rows = self.txn_repo.monthly_category_totals(range).await?;
        Ok(TrendsResponse {
            trends: build_trend_points(&rows),
        })
    }

    #[instrument(skip(self))]
    async fn categories(&self, range: DateRange) -> Result<CategoriesResponse, ServiceError> {
        let categories = self.txn_repo.category_totals(range).await?;
        Ok(CategoriesResponse { categories })
    }

    #[instrument(skip(self))]
    async fn user_performance(
        &self,
        range: DateRange,
    ) -> Result<UsersPerformanceResponse, ServiceError> {
        let users = self.txn_repo.user_rollups(range).await?;
        Ok(UsersPerformanceResponse { users })
    }

    /// Fixed window: January 1st of last year through December 31st of the
    /// current year.
    #[instrument(skip(self))]
    async fn monthly_comparison(&self) -> Result<MonthlyComparisonResponse, ServiceError> {
        let current_year = Utc::now().year();
        let range = DateRange {
            start: Utc
                .with_ymd_and_hms(current_year - 1, 1, 1, 0, 0, 0)
                .single(),
            end: Utc
                .with_ymd_and_hms(current_year, 12, 31, 0, 0, 0)
                .single(),
        };
        let rows = self.txn_repo.monthly_category_totals(range).await?;
        Ok(MonthlyComparisonResponse {
            comparison: build_monthly_points(&rows),
        })
    }
}
