use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Revenue,
    Expense,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Revenue => "Revenue",
            Category::Expense => "Expense",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Revenue" => Ok(Category::Revenue),
            "Expense" => Ok(Category::Expense),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Paid,
    Pending,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Paid => "Paid",
            TransactionStatus::Pending => "Pending",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Paid" => Ok(TransactionStatus::Paid),
            "Pending" => Ok(TransactionStatus::Pending),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// A ledger entry.
///
/// `id` is the external key: every lookup, update and delete goes through it.
/// `_id` is storage identity only and never leaves the repository layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub object_id: Option<ObjectId>,
    pub id: i64,
    pub date: bson::DateTime,
    pub amount: f64,
    pub category: Category,
    pub status: TransactionStatus,
    pub user_id: String,
    pub user_profile: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Inclusive date window; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Conjunction of optional predicates over the transaction collection.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub status: Option<TransactionStatus>,
    pub user_id: Option<String>,
    pub date_range: DateRange,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Date,
    Amount,
    Category,
    Status,
    UserId,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Date => "date",
            SortField::Amount => "amount",
            SortField::Category => "category",
            SortField::Status => "status",
            SortField::UserId => "user_id",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "date" => Ok(SortField::Date),
            "amount" => Ok(SortField::Amount),
            "category" => Ok(SortField::Category),
            "status" => Ok(SortField::Status),
            "user_id" => Ok(SortField::UserId),
            other => Err(format!("Unsortable field: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for TransactionSort {
    fn default() -> Self {
        TransactionSort {
            field: SortField::Date,
            order: SortOrder::Desc,
        }
    }
}

/// Partial update; only present fields are applied.
#[derive(Debug, Clone, Default)]
pub struct TransactionChanges {
    pub date: Option<DateTime<Utc>>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
    pub status: Option<TransactionStatus>,
    pub user_id: Option<String>,
    pub user_profile: Option<String>,
}

impl TransactionChanges {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.user_id.is_none()
            && self.user_profile.is_none()
    }
}
