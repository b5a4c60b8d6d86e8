use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::mongo_conf::MongoConfig;
use crate::model::transaction::{
    Category, DateRange, Transaction, TransactionChanges, TransactionFilter, TransactionSort,
    TransactionStatus,
};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Per-category totals, as produced by the category aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTotalRow {
    #[serde(rename = "_id")]
    pub category: Category,
    pub total: f64,
    pub count: i64,
    #[serde(rename = "avgAmount")]
    pub avg_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBreakdownRow {
    #[serde(rename = "_id")]
    pub status: TransactionStatus,
    pub count: i64,
    pub total: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
    pub category: Category,
}

/// One (year, month, category) bucket of the monthly grouping.
#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyCategoryRow {
    #[serde(rename = "_id")]
    pub key: MonthKey,
    pub total: f64,
    pub count: i64,
}

/// Per-user rollup; field names match the wire format of the users endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPerformanceRow {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub transaction_count: i64,
    pub revenue_count: i64,
    pub expense_count: i64,
    pub net_income: f64,
    pub avg_transaction_value: f64,
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, txn: Transaction) -> RepositoryResult<Transaction>;
    async fn insert_many(&self, txns: Vec<Transaction>) -> RepositoryResult<usize>;
    /// Lookup by the external integer id, never by `_id`
    async fn get(&self, id: i64) -> RepositoryResult<Transaction>;
    async fn update(&self, id: i64, changes: TransactionChanges) -> RepositoryResult<Transaction>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
    async fn list(
        &self,
        filter: &TransactionFilter,
        sort: TransactionSort,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<Vec<Transaction>>;
    async fn count(&self, filter: &TransactionFilter) -> RepositoryResult<u64>;
    /// Full matching set, in stored order; used by the CSV export
    async fn find_all(&self, filter: &TransactionFilter) -> RepositoryResult<Vec<Transaction>>;
    async fn distinct_values(&self, field: &str) -> RepositoryResult<Vec<String>>;
    async fn category_totals(&self, range: DateRange) -> RepositoryResult<Vec<CategoryTotalRow>>;
    async fn status_breakdown(&self, range: DateRange) -> RepositoryResult<Vec<StatusBreakdownRow>>;
    async fn monthly_category_totals(
        &self,
        range: DateRange,
    ) -> RepositoryResult<Vec<MonthlyCategoryRow>>;
    async fn user_rollups(&self, range: DateRange) -> RepositoryResult<Vec<UserPerformanceRow>>;
    /// Store connectivity probe for the health endpoint
    async fn ping(&self) -> bool;
}

/// Builds the MongoDB filter document for a [`TransactionFilter`].
///
/// Free-text search matches category/status case-insensitively; a numeric
/// search term also matches the external id exactly.
pub fn build_filter_document(filter: &TransactionFilter) -> Document {
    let mut doc = Document::new();

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let mut or = vec![
            doc! { "category": { "$regex": search, "$options": "i" } },
            doc! { "status": { "$regex": search, "$options": "i" } },
        ];
        if let Ok(id) = search.trim().parse::<i64>() {
            or.push(doc! { "id": id });
        }
        doc.insert("$or", or);
    }

    if let Some(category) = filter.category {
        doc.insert("category", category.as_str());
    }
    if let Some(status) = filter.status {
        doc.insert("status", status.as_str());
    }
    if let Some(ref user_id) = filter.user_id {
        doc.insert("user_id", user_id.as_str());
    }

    if let Some(range) = date_range_document(filter.date_range) {
        doc.insert("date", range);
    }

    if filter.min_amount.is_some() || filter.max_amount.is_some() {
        let mut amount = Document::new();
        if let Some(min) = filter.min_amount {
            amount.insert("$gte", min);
        }
        if let Some(max) = filter.max_amount {
            amount.insert("$lte", max);
        }
        doc.insert("amount", amount);
    }

    doc
}

fn date_range_document(range: DateRange) -> Option<Document> {
    if range.is_open() {
        return None;
    }
    let mut doc = Document::new();
    if let Some(start) = range.start {
        doc.insert("$gte", bson::DateTime::from_chrono(start));
    }
    if let Some(end) = range.end {
        doc.insert("$lte", bson::DateTime::from_chrono(end));
    }
    Some(doc)
}

fn match_stage(range: DateRange) -> Document {
    match date_range_document(range) {
        Some(date) => doc! { "$match": { "date": date } },
        None => doc! { "$match": {} },
    }
}

pub struct MongoTransactionRepository {
    collection: mongodb::Collection<Transaction>,
    db: mongodb::Database,
}

impl MongoTransactionRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        use mongodb::{
            options::{ClientOptions, Credential, IndexOptions, ResolverConfig},
            Client, IndexModel,
        };

        let mut client_options =
            ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare())
                .await?;
        client_options.app_name = Some("FinboardBackend".to_string());
        client_options.max_pool_size = Some(config.pool_size);
        client_options.connect_timeout =
            Some(std::time::Duration::from_secs(config.connection_timeout_secs));
        if let (Some(ref username), Some(ref password)) = (&config.username, &config.password) {
            client_options.credential = Some(
                Credential::builder()
                    .username(username.clone())
                    .password(password.clone())
                    .build(),
            );
        }
        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database);
        let collection = db.collection::<Transaction>("transactions");

        let unique_id = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection.create_index(unique_id, None).await?;
        for field in ["date", "category", "status", "user_id"] {
            let mut keys = Document::new();
            keys.insert(field, 1);
            let index = IndexModel::builder().keys(keys).build();
            collection.create_index(index, None).await?;
        }

        Ok(MongoTransactionRepository { collection, db })
    }

    async fn drain<T>(mut cursor: mongodb::Cursor<T>) -> RepositoryResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned + Unpin + Send + Sync,
    {
        let mut items = Vec::new();
        while let Some(item) = cursor.next().await {
            match item {
                Ok(t) => items.push(t),
                Err(e) => {
                    error!("Failed to deserialize document: {}", e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize document: {}",
                        e
                    )));
                }
            }
        }
        Ok(items)
    }

    async fn run_pipeline<T>(&self, pipeline: Vec<Document>) -> RepositoryResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut cursor = self
            .collection
            .aggregate(pipeline, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Aggregation failed: {}", e)))?;
        let mut rows = Vec::new();
        while let Some(item) = cursor.next().await {
            match item {
                Ok(doc) => rows.push(bson::from_document::<T>(doc)?),
                Err(e) => {
                    error!("Aggregation cursor error: {}", e);
                    return Err(RepositoryError::database(format!(
                        "Aggregation cursor error: {}",
                        e
                    )));
                }
            }
        }
        Ok(rows)
    }
}

#[async_trait]
impl TransactionRepository for MongoTransactionRepository {
    #[tracing::instrument(skip(self, txn), fields(id = txn.id))]
    async fn insert(&self, mut txn: Transaction) -> RepositoryResult<Transaction> {
        txn.object_id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        txn.created_at = Some(now.clone());
        txn.updated_at = Some(now);
        match self.collection.insert_one(txn.clone(), None).await {
            Ok(_) => {
                info!("Transaction {} created", txn.id);
                Ok(txn)
            }
            Err(e) => {
                error!("Failed to create transaction: {}", e);
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(skip(self, txns), fields(count = txns.len()))]
    async fn insert_many(&self, txns: Vec<Transaction>) -> RepositoryResult<usize> {
        if txns.is_empty() {
            return Ok(0);
        }
        let now = chrono::Utc::now().to_rfc3339();
        let txns: Vec<Transaction> = txns
            .into_iter()
            .map(|mut t| {
                t.object_id = Some(ObjectId::new());
                t.created_at = Some(now.clone());
                t.updated_at = Some(now.clone());
                t
            })
            .collect();
        let count = txns.len();
        match self.collection.insert_many(txns, None).await {
            Ok(_) => {
                info!("Inserted {} transactions", count);
                Ok(count)
            }
            Err(e) => {
                error!("Failed to bulk insert transactions: {}", e);
                Err(e.into())
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = id))]
    async fn get(&self, id: i64) -> RepositoryResult<Transaction> {
        let filter = doc! { "id": id };
        match self.collection.find_one(filter, None).await {
            Ok(Some(txn)) => Ok(txn),
            Ok(None) => Err(RepositoryError::not_found(format!(
                "Transaction not found for ID: {}",
                id
            ))),
            Err(e) => {
                error!("Failed to fetch transaction by ID: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to fetch transaction by ID: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self, changes), fields(id = id))]
    async fn update(&self, id: i64, changes: TransactionChanges) -> RepositoryResult<Transaction> {
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let mut set = Document::new();
        if let Some(date) = changes.date {
            set.insert("date", bson::DateTime::from_chrono(date));
        }
        if let Some(amount) = changes.amount {
            set.insert("amount", amount);
        }
        if let Some(category) = changes.category {
            set.insert("category", category.as_str());
        }
        if let Some(status) = changes.status {
            set.insert("status", status.as_str());
        }
        if let Some(user_id) = changes.user_id {
            set.insert("user_id", user_id);
        }
        if let Some(user_profile) = changes.user_profile {
            set.insert("user_profile", user_profile);
        }
        set.insert("updated_at", chrono::Utc::now().to_rfc3339());

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        match self
            .collection
            .find_one_and_update(doc! { "id": id }, doc! { "$set": set }, options)
            .await
        {
            Ok(Some(txn)) => {
                info!("Transaction {} updated", id);
                Ok(txn)
            }
            Ok(None) => Err(RepositoryError::not_found(format!(
                "Transaction not found for ID: {}",
                id
            ))),
            Err(e) => {
                error!("Failed to update transaction: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to update transaction: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = id))]
    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let filter = doc! { "id": id };
        match self.collection.delete_one(filter, None).await {
            Ok(result) if result.deleted_count > 0 => {
                info!("Transaction {} deleted", id);
                Ok(())
            }
            Ok(_) => Err(RepositoryError::not_found(format!(
                "Transaction not found for ID: {}",
                id
            ))),
            Err(e) => {
                error!("Failed to delete transaction: {}", e);
                Err(RepositoryError::database(format!(
                    "Failed to delete transaction: {}",
                    e
                )))
            }
        }
    }

    #[tracing::instrument(skip(self, filter), fields(page = page, limit = limit))]
    async fn list(
        &self,
        filter: &TransactionFilter,
        sort: TransactionSort,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<Vec<Transaction>> {
        use mongodb::options::FindOptions;

        let order: i32 = match sort.order {
            crate::model::transaction::SortOrder::Asc => 1,
            crate::model::transaction::SortOrder::Desc => -1,
        };
        let mut sort_doc = Document::new();
        sort_doc.insert(sort.field.as_str(), order);
        let skip = (page.saturating_sub(1) as u64) * limit as u64;
        let options = FindOptions::builder()
            .sort(sort_doc)
            .skip(skip)
            .limit(limit as i64)
            .build();

        let cursor = self
            .collection
            .find(build_filter_document(filter), options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list transactions: {}", e)))?;
        Self::drain(cursor).await
    }

    async fn count(&self, filter: &TransactionFilter) -> RepositoryResult<u64> {
        self.collection
            .count_documents(build_filter_document(filter), None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count transactions: {}", e)))
    }

    #[tracing::instrument(skip(self, filter))]
    async fn find_all(&self, filter: &TransactionFilter) -> RepositoryResult<Vec<Transaction>> {
        let cursor = self
            .collection
            .find(build_filter_document(filter), None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch transactions: {}", e)))?;
        Self::drain(cursor).await
    }

    async fn distinct_values(&self, field: &str) -> RepositoryResult<Vec<String>> {
        let values = self
            .collection
            .distinct(field, None, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch distinct values: {}", e)))?;
        Ok(values
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }

    async fn category_totals(&self, range: DateRange) -> RepositoryResult<Vec<CategoryTotalRow>> {
        let pipeline = vec![
            match_stage(range),
            doc! { "$group": {
                "_id": "$category",
                "total": { "$sum": "$amount" },
                "count": { "$sum": 1 },
                "avgAmount": { "$avg": "$amount" },
            }},
            doc! { "$sort": { "total": -1 } },
        ];
        self.run_pipeline(pipeline).await
    }

    async fn status_breakdown(&self, range: DateRange) -> RepositoryResult<Vec<StatusBreakdownRow>> {
        let pipeline = vec![
            match_stage(range),
            doc! { "$group": {
                "_id": "$status",
                "count": { "$sum": 1 },
                "total": { "$sum": "$amount" },
            }},
        ];
        self.run_pipeline(pipeline).await
    }

    async fn monthly_category_totals(
        &self,
        range: DateRange,
    ) -> RepositoryResult<Vec<MonthlyCategoryRow>> {
        let pipeline = vec![
            match_stage(range),
            doc! { "$group": {
                "_id": {
                    "year": { "$year": "$date" },
                    "month": { "$month": "$date" },
                    "category": "$category",
                },
                "total": { "$sum": "$amount" },
                "count": { "$sum": 1 },
            }},
            doc! { "$sort": { "_id.year": 1, "_id.month": 1 } },
        ];
        self.run_pipeline(pipeline).await
    }

    async fn user_rollups(&self, range: DateRange) -> RepositoryResult<Vec<UserPerformanceRow>> {
        let pipeline = vec![
            match_stage(range),
            doc! { "$group": {
                "_id": "$user_id",
                "totalRevenue": {
                    "$sum": { "$cond": [{ "$eq": ["$category", "Revenue"] }, "$amount", 0] }
                },
                "totalExpenses": {
                    "$sum": { "$cond": [{ "$eq": ["$category", "Expense"] }, "$amount", 0] }
                },
                "transactionCount": { "$sum": 1 },
                "revenueCount": {
                    "$sum": { "$cond": [{ "$eq": ["$category", "Revenue"] }, 1, 0] }
                },
                "expenseCount": {
                    "$sum": { "$cond": [{ "$eq": ["$category", "Expense"] }, 1, 0] }
                },
            }},
            doc! { "$addFields": {
                "netIncome": { "$subtract": ["$totalRevenue", "$totalExpenses"] },
                "avgTransactionValue": {
                    "$divide": [
                        { "$add": ["$totalRevenue", "$totalExpenses"] },
                        "$transactionCount",
                    ]
                },
            }},
            doc! { "$sort": { "netIncome": -1 } },
        ];
        self.run_pipeline(pipeline).await
    }

    async fn ping(&self) -> bool {
        self.db.run_command(doc! { "ping": 1 }, None).await.is_ok()
    }
}
