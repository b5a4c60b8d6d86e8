use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::dto::auth_dto::AuthUser;
use crate::dto::transaction_dto::{
    CreateTransactionRequest, FilterValuesResponse, ListTransactionsQuery,
    ListTransactionsResponse, PaginationInfo, TransactionResponse, UpdateTransactionRequest,
    UserIdOption,
};
use crate::model::activity::ActivityEntry;
use crate::repository::activity_repo::ActivityRepository;
use crate::repository::transaction_repo::TransactionRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait TransactionService: Send + Sync {
    async fn list(
        &self,
        query: ListTransactionsQuery,
    ) -> Result<ListTransactionsResponse, ServiceError>;
    async fn get(&self, id: i64) -> Result<TransactionResponse, ServiceError>;
    async fn create(
        &self,
        actor: &AuthUser,
        request: CreateTransactionRequest,
    ) -> Result<TransactionResponse, ServiceError>;
    async fn update(
        &self,
        actor: &AuthUser,
        id: i64,
        request: UpdateTransactionRequest,
    ) -> Result<TransactionResponse, ServiceError>;
    async fn delete(&self, actor: &AuthUser, id: i64) -> Result<(), ServiceError>;
    async fn filter_values(&self) -> Result<FilterValuesResponse, ServiceError>;
}

pub struct TransactionServiceImpl {
    pub txn_repo: Arc<dyn TransactionRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
}

impl TransactionServiceImpl {
    pub fn new(
        txn_repo: Arc<dyn TransactionRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
    ) -> Self {
        Self {
            txn_repo,
            activity_repo,
        }
    }

    async fn record(&self, actor: &AuthUser, action: &str, details: String) {
        let entry = ActivityEntry {
            id: None,
            user_id: actor.id.to_hex(),
            username: actor.username.clone(),
            action: action.to_string(),
            details,
            timestamp: bson::DateTime::now(),
        };
        if let Err(e) = self.activity_repo.insert(entry).await {
            warn!("Failed to record activity: {}", e);
        }
    }
}

#[async_trait]
impl TransactionService for TransactionServiceImpl {
    #[instrument(skip(self, query))]
    async fn list(
        &self,
        query: ListTransactionsQuery,
    ) -> Result<ListTransactionsResponse, ServiceError> {
        let filter = query.to_filter()?;
        let sort = query.to_sort()?;
        let page = query.page();
        let limit = query.limit();

        let transactions = self.txn_repo.list(&filter, sort, page, limit).await?;
        let total = self.txn_repo.count(&filter).await?;
        info!("Listed {} of {} transactions", transactions.len(), total);

        Ok(ListTransactionsResponse {
            transactions: transactions
                .into_iter()
                .map(TransactionResponse::from)
                .collect(),
            pagination: PaginationInfo {
                current_page: page,
                total_pages: total.div_ceil(limit as u64),
                total_items: total,
                items_per_page: limit,
            },
        })
    }

    async fn get(&self, id: i64) -> Result<TransactionResponse, ServiceError> {
        Ok(self.txn_repo.get(id).await?.into())
    }

    #[instrument(skip(self, actor, request), fields(id = request.id, actor = %actor.username))]
    async fn create(
        &self,
        actor: &AuthUser,
        request: CreateTransactionRequest,
    ) -> Result<TransactionResponse, ServiceError> {
        let transaction = request.to_transaction()?;
        let inserted = self.txn_repo.insert(transaction).await?;
        self.record(
            actor,
            "Created Transaction",
            format!("Created transaction #{}", inserted.id),
        )
        .await;
        Ok(inserted.into())
    }

    #[instrument(skip(self, actor, request), fields(id = id, actor = %actor.username))]
    async fn update(
        &self,
        actor: &AuthUser,
        id: i64,
        request: UpdateTransactionRequest,
    ) -> Result<TransactionResponse, ServiceError> {
        let changes = request.to_changes()?;
        if changes.is_empty() {
            return Err(ServiceError::InvalidInput(
                "No fields to update".to_string(),
            ));
        }
        let updated = self.txn_repo.update(id, changes).await?;
        self.record(
            actor,
            "Updated Transaction",
            format!("Updated transaction #{}", id),
        )
        .await;
        Ok(updated.into())
    }

    #[instrument(skip(self, actor), fields(id = id, actor = %actor.username))]
    async fn delete(&self, actor: &AuthUser, id: i64) -> Result<(), ServiceError> {
        self.txn_repo.delete(id).await?;
        self.record(
            actor,
            "Deleted Transaction",
            format!("Deleted transaction #{}", id),
        )
        .await;
        Ok(())
    }

    async fn filter_values(&self) -> Result<FilterValuesResponse, ServiceError> {
        let categories = self.txn_repo.distinct_values("category").await?;
        let statuses = self.txn_repo.distinct_values("status").await?;
        let user_ids = self.txn_repo.distinct_values("user_id").await?;

        Ok(FilterValuesResponse {
            categories,
            statuses,
            user_ids: user_ids
                .into_iter()
                .map(|id| UserIdOption {
                    label: format!("User {}", id),
                    id,
                })
                .collect(),
        })
    }
}
