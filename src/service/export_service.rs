use async_trait::async_trait;
use chrono::{Datelike, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::dto::auth_dto::AuthUser;
use crate::dto::export_dto::{ExportAnalyticsRequest, ExportColumn, ExportTransactionsRequest};
use crate::model::activity::ActivityEntry;
use crate::model::transaction::Transaction;
use crate::repository::activity_repo::ActivityRepository;
use crate::repository::transaction_repo::TransactionRepository;
use crate::util::error::ServiceError;

/// The exportable transaction fields offered to clients.
pub const EXPORT_COLUMNS: &[ExportColumn] = &[
    ExportColumn { field: "id", header_name: "ID", column_type: "number" },
    ExportColumn { field: "date", header_name: "Date", column_type: "date" },
    ExportColumn { field: "amount", header_name: "Amount", column_type: "number" },
    ExportColumn { field: "category", header_name: "Category", column_type: "string" },
    ExportColumn { field: "status", header_name: "Status", column_type: "string" },
    ExportColumn { field: "user_id", header_name: "User ID", column_type: "string" },
    ExportColumn { field: "user_profile", header_name: "User Profile", column_type: "string" },
];

const ANALYTICS_COLUMNS: &[&str] = &[
    "totalTransactions",
    "totalAmount",
    "averageAmount",
    "categories",
    "statuses",
    "dateRange",
];

/// A rendered CSV attachment.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

#[async_trait]
pub trait ExportService: Send + Sync {
    fn columns(&self) -> Vec<ExportColumn>;
    async fn export_transactions(
        &self,
        actor: &AuthUser,
        request: ExportTransactionsRequest,
    ) -> Result<CsvExport, ServiceError>;
    async fn export_analytics(
        &self,
        actor: &AuthUser,
        request: ExportAnalyticsRequest,
    ) -> Result<CsvExport, ServiceError>;
}

pub struct ExportServiceImpl {
    pub txn_repo: Arc<dyn TransactionRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
}

impl ExportServiceImpl {
    pub fn new(
        txn_repo: Arc<dyn TransactionRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
    ) -> Self {
        Self {
            txn_repo,
            activity_repo,
        }
    }

    async fn record(&self, actor: &AuthUser, details: String) {
        let entry = ActivityEntry {
            id: None,
            user_id: actor.id.to_hex(),
            username: actor.username.clone(),
            action: "Exported CSV".to_string(),
            details,
            timestamp: bson::DateTime::now(),
        };
        if let Err(e) = self.activity_repo.insert(entry).await {
            warn!("Failed to record activity: {}", e);
        }
    }
}

/// "user_id" -> "User_id": first letter upper, the rest untouched.
pub fn capitalize(column: &str) -> String {
    let mut chars = column.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// "totalTransactions" -> "Total Transactions".
pub fn title_from_camel_case(column: &str) -> String {
    let mut out = String::with_capacity(column.len() + 4);
    for (i, c) in column.chars().enumerate() {
        if i == 0 {
            out.extend(c.to_uppercase());
        } else {
            if c.is_ascii_uppercase() {
                out.push(' ');
            }
            out.push(c);
        }
    }
    out
}

/// Dates render the way a dashboard user reads them, not RFC3339.
pub fn format_locale_date(date: bson::DateTime) -> String {
    let dt = date.to_chrono();
    format!("{}/{}/{}", dt.month(), dt.day(), dt.year())
}

pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

fn column_value(txn: &Transaction, column: &str) -> String {
    match column {
        "id" => txn.id.to_string(),
        "date" => format_locale_date(txn.date),
        "amount" => format_currency(txn.amount),
        "category" => txn.category.as_str().to_string(),
        "status" => txn.status.as_str().to_string(),
        "user_id" => txn.user_id.clone(),
        "user_profile" => txn.user_profile.clone(),
        _ => String::new(),
    }
}

fn csv_to_string(writer: csv::Writer<Vec<u8>>) -> Result<String, ServiceError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::InternalError(format!("CSV flush error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::InternalError(format!("CSV encoding error: {}", e)))
}

/// Serializes the selected columns of the given transactions. The header row
/// is each column id with its first letter capitalized.
pub fn write_transactions_csv(
    transactions: &[Transaction],
    columns: &[String],
) -> Result<String, ServiceError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(columns.iter().map(|c| capitalize(c)))
        .map_err(|e| ServiceError::InternalError(format!("CSV write error: {}", e)))?;
    for txn in transactions {
        let row: Vec<String> = columns.iter().map(|c| column_value(txn, c)).collect();
        writer
            .write_record(&row)
            .map_err(|e| ServiceError::InternalError(format!("CSV write error: {}", e)))?;
    }
    csv_to_string(writer)
}

/// Single-row rollup of the filtered set for the analytics export.
pub fn write_analytics_csv(
    transactions: &[Transaction],
    date_range_label: &str,
) -> Result<String, ServiceError> {
    let total_amount: f64 = transactions.iter().map(|t| t.amount).sum();
    let average_amount = if transactions.is_empty() {
        0.0
    } else {
        total_amount / transactions.len() as f64
    };
    let categories: BTreeSet<&str> = transactions.iter().map(|t| t.category.as_str()).collect();
    let statuses: BTreeSet<&str> = transactions.iter().map(|t| t.status.as_str()).collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(ANALYTICS_COLUMNS.iter().map(|c| title_from_camel_case(c)))
        .map_err(|e| ServiceError::InternalError(format!("CSV write error: {}", e)))?;
    writer
        .write_record(&[
            transactions.len().to_string(),
            total_amount.to_string(),
            average_amount.to_string(),
            categories.into_iter().collect::<Vec<_>>().join(", "),
            statuses.into_iter().collect::<Vec<_>>().join(", "),
            date_range_label.to_string(),
        ])
        .map_err(|e| ServiceError::InternalError(format!("CSV write error: {}", e)))?;
    csv_to_string(writer)
}

fn date_range_label(start: Option<&str>, end: Option<&str>) -> String {
    format!("{} to {}", start.unwrap_or("N/A"), end.unwrap_or("N/A"))
}

fn stamped_filename(prefix: &str) -> String {
    format!("{}_{}.csv", prefix, Utc::now().format("%Y-%m-%d"))
}

#[async_trait]
impl ExportService for ExportServiceImpl {
    fn columns(&self) -> Vec<ExportColumn> {
        EXPORT_COLUMNS.to_vec()
    }

    #[instrument(skip(self, actor, request), fields(actor = %actor.username))]
    async fn export_transactions(
        &self,
        actor: &AuthUser,
        request: ExportTransactionsRequest,
    ) -> Result<CsvExport, ServiceError> {
        if request.selected_columns.is_empty() {
            return Err(ServiceError::InvalidInput(
                "No columns selected for export".to_string(),
            ));
        }
        for column in &request.selected_columns {
            if !EXPORT_COLUMNS.iter().any(|c| c.field == column) {
                return Err(ServiceError::InvalidInput(format!(
                    "Unknown export column: {}",
                    column
                )));
            }
        }

        let filter = request.filters.to_filter()?;
        let transactions = self.txn_repo.find_all(&filter).await?;
        info!("Exporting {} transactions to CSV", transactions.len());
        let content = write_transactions_csv(&transactions, &request.selected_columns)?;

        self.record(actor, format!("Exported {} transactions", transactions.len()))
            .await;
        Ok(CsvExport {
            filename: stamped_filename("transactions"),
            content,
        })
    }

    #[instrument(skip(self, actor, request), fields(actor = %actor.username))]
    async fn export_analytics(
        &self,
        actor: &AuthUser,
        request: ExportAnalyticsRequest,
    ) -> Result<CsvExport, ServiceError> {
        let filter = request.filters.to_filter()?;
        let transactions = self.txn_repo.find_all(&filter).await?;
        info!(
            "Exporting analytics summary over {} transactions",
            transactions.len()
        );
        let label = date_range_label(
            request.filters.start_date.as_deref(),
            request.filters.end_date.as_deref(),
        );
        let content = write_analytics_csv(&transactions, &label)?;

        self.record(actor, "Exported analytics summary".to_string())
            .await;
        Ok(CsvExport {
            filename: stamped_filename("analytics"),
            content,
        })
    }
}
