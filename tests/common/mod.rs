#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use bson::oid::ObjectId;
use chrono::Datelike;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use finboard_backend::config::{AppConfig, JwtConfig, SeedConfig};
use finboard_backend::dto::auth_dto::{AuthResponse, RegisterRequest};
use finboard_backend::handler::health_handler::HealthState;
use finboard_backend::middlewares::auth_middleware::AuthState;
use finboard_backend::model::activity::ActivityEntry;
use finboard_backend::model::transaction::{
    Category, DateRange, SortField, SortOrder, Transaction, TransactionChanges, TransactionFilter,
    TransactionSort, TransactionStatus,
};
use finboard_backend::model::user::{Role, User};
use finboard_backend::repository::activity_repo::ActivityRepository;
use finboard_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use finboard_backend::repository::transaction_repo::{
    CategoryTotalRow, MonthKey, MonthlyCategoryRow, StatusBreakdownRow, TransactionRepository,
    UserPerformanceRow,
};
use finboard_backend::repository::user_repo::UserRepository;
use finboard_backend::router::analytics_router::analytics_router;
use finboard_backend::router::auth_router::auth_router;
use finboard_backend::router::export_router::export_router;
use finboard_backend::router::health_router::health_router;
use finboard_backend::router::transaction_router::transaction_router;
use finboard_backend::service::analytics_service::AnalyticsServiceImpl;
use finboard_backend::service::export_service::ExportServiceImpl;
use finboard_backend::service::transaction_service::TransactionServiceImpl;
use finboard_backend::service::user_service::{UserService, UserServiceImpl};
use finboard_backend::util::jwt::JwtTokenUtilsImpl;

// ---------------------------------------------------------------------------
// In-memory repositories
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockUserRepository {
    users: Mutex<Vec<User>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(RepositoryError::already_exists("Duplicate key"));
        }
        user.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: ObjectId, user: User) -> RepositoryResult<User> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == Some(id)) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => Err(RepositoryError::not_found("No user found to update")),
        }
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id.as_ref() == Some(id))
            .cloned())
    }

    async fn find_by_role(&self, role: Role) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.role == role)
            .cloned())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }
}

fn in_range(range: DateRange, date: bson::DateTime) -> bool {
    let date = date.to_chrono();
    if let Some(start) = range.start {
        if date < start {
            return false;
        }
    }
    if let Some(end) = range.end {
        if date > end {
            return false;
        }
    }
    true
}

fn matches(filter: &TransactionFilter, txn: &Transaction) -> bool {
    if let Some(ref search) = filter.search {
        let needle = search.to_lowercase();
        let mut hit = txn.category.as_str().to_lowercase().contains(&needle)
            || txn.status.as_str().to_lowercase().contains(&needle);
        if let Ok(id) = search.trim().parse::<i64>() {
            hit = hit || txn.id == id;
        }
        if !hit {
            return false;
        }
    }
    if let Some(category) = filter.category {
        if txn.category != category {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if txn.status != status {
            return false;
        }
    }
    if let Some(ref user_id) = filter.user_id {
        if &txn.user_id != user_id {
            return false;
        }
    }
    if !in_range(filter.date_range, txn.date) {
        return false;
    }
    if let Some(min) = filter.min_amount {
        if txn.amount < min {
            return false;
        }
    }
    if let Some(max) = filter.max_amount {
        if txn.amount > max {
            return false;
        }
    }
    true
}

fn compare(a: &Transaction, b: &Transaction, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Date => a.date.cmp(&b.date),
        SortField::Amount => a.amount.partial_cmp(&b.amount).unwrap_or(Ordering::Equal),
        SortField::Category => a.category.as_str().cmp(b.category.as_str()),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::UserId => a.user_id.cmp(&b.user_id),
    }
}

#[derive(Default)]
pub struct MockTransactionRepository {
    txns: Mutex<Vec<Transaction>>,
}

impl MockTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, txns: Vec<Transaction>) {
        self.txns.lock().unwrap().extend(txns);
    }

    fn filtered(&self, filter: &TransactionFilter) -> Vec<Transaction> {
        self.txns
            .lock()
            .unwrap()
            .iter()
            .filter(|t| matches(filter, t))
            .cloned()
            .collect()
    }

    fn in_window(&self, range: DateRange) -> Vec<Transaction> {
        self.txns
            .lock()
            .unwrap()
            .iter()
            .filter(|t| in_range(range, t.date))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TransactionRepository for MockTransactionRepository {
    async fn insert(&self, mut txn: Transaction) -> RepositoryResult<Transaction> {
        let mut txns = self.txns.lock().unwrap();
        if txns.iter().any(|t| t.id == txn.id) {
            return Err(RepositoryError::already_exists("Duplicate key"));
        }
        txn.object_id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        txn.created_at = Some(now.clone());
        txn.updated_at = Some(now);
        txns.push(txn.clone());
        Ok(txn)
    }

    async fn insert_many(&self, txns: Vec<Transaction>) -> RepositoryResult<usize> {
        let count = txns.len();
        self.txns.lock().unwrap().extend(txns);
        Ok(count)
    }

    async fn get(&self, id: i64) -> RepositoryResult<Transaction> {
        self.txns
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("Transaction not found for ID: {}", id)))
    }

    async fn update(&self, id: i64, changes: TransactionChanges) -> RepositoryResult<Transaction> {
        let mut txns = self.txns.lock().unwrap();
        let txn = txns
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| RepositoryError::not_found(format!("Transaction not found for ID: {}", id)))?;
        if let Some(date) = changes.date {
            txn.date = bson::DateTime::from_chrono(date);
        }
        if let Some(amount) = changes.amount {
            txn.amount = amount;
        }
        if let Some(category) = changes.category {
            txn.category = category;
        }
        if let Some(status) = changes.status {
            txn.status = status;
        }
        if let Some(user_id) = changes.user_id {
            txn.user_id = user_id;
        }
        if let Some(user_profile) = changes.user_profile {
            txn.user_profile = user_profile;
        }
        txn.updated_at = Some(chrono::Utc::now().to_rfc3339());
        Ok(txn.clone())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let mut txns = self.txns.lock().unwrap();
        let before = txns.len();
        txns.retain(|t| t.id != id);
        if txns.len() == before {
            return Err(RepositoryError::not_found(format!(
                "Transaction not found for ID: {}",
                id
            )));
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: &TransactionFilter,
        sort: TransactionSort,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<Vec<Transaction>> {
        let mut txns = self.filtered(filter);
        txns.sort_by(|a, b| {
            let ordering = compare(a, b, sort.field);
            match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        let skip = ((page.max(1) - 1) * limit) as usize;
        Ok(txns.into_iter().skip(skip).take(limit as usize).collect())
    }

    async fn count(&self, filter: &TransactionFilter) -> RepositoryResult<u64> {
        Ok(self.filtered(filter).len() as u64)
    }

    async fn find_all(&self, filter: &TransactionFilter) -> RepositoryResult<Vec<Transaction>> {
        Ok(self.filtered(filter))
    }

    async fn distinct_values(&self, field: &str) -> RepositoryResult<Vec<String>> {
        let txns = self.txns.lock().unwrap();
        let mut values: Vec<String> = txns
            .iter()
            .map(|t| match field {
                "category" => t.category.as_str().to_string(),
                "status" => t.status.as_str().to_string(),
                "user_id" => t.user_id.clone(),
                _ => String::new(),
            })
            .collect();
        values.sort();
        values.dedup();
        Ok(values)
    }

    async fn category_totals(&self, range: DateRange) -> RepositoryResult<Vec<CategoryTotalRow>> {
        let mut groups: HashMap<&'static str, (f64, i64)> = HashMap::new();
        for txn in self.in_window(range) {
            let entry = groups.entry(txn.category.as_str()).or_default();
            entry.0 += txn.amount;
            entry.1 += 1;
        }
        let mut rows: Vec<CategoryTotalRow> = groups
            .into_iter()
            .map(|(category, (total, count))| CategoryTotalRow {
                category: Category::from_str(category).unwrap(),
                total,
                count,
                avg_amount: total / count as f64,
            })
            .collect();
        rows.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
        Ok(rows)
    }

    async fn status_breakdown(&self, range: DateRange) -> RepositoryResult<Vec<StatusBreakdownRow>> {
        let mut groups: HashMap<&'static str, (i64, f64)> = HashMap::new();
        for txn in self.in_window(range) {
            let entry = groups.entry(txn.status.as_str()).or_default();
            entry.0 += 1;
            entry.1 += txn.amount;
        }
        Ok(groups
            .into_iter()
            .map(|(status, (count, total))| StatusBreakdownRow {
                status: TransactionStatus::from_str(status).unwrap(),
                count,
                total,
            })
            .collect())
    }

    async fn monthly_category_totals(
        &self,
        range: DateRange,
    ) -> RepositoryResult<Vec<MonthlyCategoryRow>> {
        let mut groups: BTreeMap<(i32, u32, &'static str), (f64, i64)> = BTreeMap::new();
        for txn in self.in_window(range) {
            let date = txn.date.to_chrono();
            let key = (date.year(), date.month(), txn.category.as_str());
            let entry = groups.entry(key).or_default();
            entry.0 += txn.amount;
            entry.1 += 1;
        }
        Ok(groups
            .into_iter()
            .map(|((year, month, category), (total, count))| MonthlyCategoryRow {
                key: MonthKey {
                    year,
                    month,
                    category: Category::from_str(category).unwrap(),
                },
                total,
                count,
            })
            .collect())
    }

    async fn user_rollups(&self, range: DateRange) -> RepositoryResult<Vec<UserPerformanceRow>> {
        let mut groups: HashMap<String, (f64, f64, i64, i64, i64)> = HashMap::new();
        for txn in self.in_window(range) {
            let entry = groups.entry(txn.user_id.clone()).or_default();
            match txn.category {
                Category::Revenue => {
                    entry.0 += txn.amount;
                    entry.3 += 1;
                }
                Category::Expense => {
                    entry.1 += txn.amount;
                    entry.4 += 1;
                }
            }
            entry.2 += 1;
        }
        let mut rows: Vec<UserPerformanceRow> = groups
            .into_iter()
            .map(
                |(user_id, (revenue, expenses, count, revenue_count, expense_count))| {
                    UserPerformanceRow {
                        user_id,
                        total_revenue: revenue,
                        total_expenses: expenses,
                        transaction_count: count,
                        revenue_count,
                        expense_count,
                        net_income: revenue - expenses,
                        avg_transaction_value: (revenue + expenses) / count as f64,
                    }
                },
            )
            .collect();
        rows.sort_by(|a, b| {
            b.net_income
                .partial_cmp(&a.net_income)
                .unwrap_or(Ordering::Equal)
        });
        Ok(rows)
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[derive(Default)]
pub struct MockActivityRepository {
    entries: Mutex<Vec<ActivityEntry>>,
}

impl MockActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActivityRepository for MockActivityRepository {
    async fn insert(&self, mut entry: ActivityEntry) -> RepositoryResult<ActivityEntry> {
        entry.id = Some(ObjectId::new());
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<ActivityEntry>> {
        let mut entries = self.entries.lock().unwrap().clone();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries.truncate(limit as usize);
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Test application assembly
// ---------------------------------------------------------------------------

pub struct TestContext {
    pub router: Router,
    pub user_repo: Arc<MockUserRepository>,
    pub txn_repo: Arc<MockTransactionRepository>,
    pub activity_repo: Arc<MockActivityRepository>,
    pub user_service: Arc<UserServiceImpl>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

impl TestContext {
    pub fn new() -> Self {
        let config = AppConfig::default();
        let jwt_config = JwtConfig::default();
        let seed_config = SeedConfig::from_env();

        let user_repo = Arc::new(MockUserRepository::new());
        let txn_repo = Arc::new(MockTransactionRepository::new());
        let activity_repo = Arc::new(MockActivityRepository::new());

        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let user_service = Arc::new(UserServiceImpl::new(
            user_repo.clone(),
            activity_repo.clone(),
            jwt_utils.clone(),
            seed_config,
        ));
        let txn_service = Arc::new(TransactionServiceImpl::new(
            txn_repo.clone(),
            activity_repo.clone(),
        ));
        let analytics_service = Arc::new(AnalyticsServiceImpl::new(txn_repo.clone()));
        let export_service = Arc::new(ExportServiceImpl::new(
            txn_repo.clone(),
            activity_repo.clone(),
        ));

        let auth_state = Arc::new(AuthState {
            jwt_utils: jwt_utils.clone(),
            user_repo: user_repo.clone(),
        });
        let health_state = Arc::new(HealthState {
            config,
            store: txn_repo.clone(),
        });

        let api = Router::new()
            .merge(auth_router(user_service.clone(), auth_state.clone()))
            .merge(transaction_router(txn_service, auth_state.clone()))
            .merge(analytics_router(analytics_service, auth_state.clone()))
            .merge(export_router(export_service, auth_state));
        let router = Router::new()
            .nest("/api", api)
            .merge(health_router(health_state));

        TestContext {
            router,
            user_repo,
            txn_repo,
            activity_repo,
            user_service,
            jwt_utils,
        }
    }

    pub async fn register(&self, username: &str, role: Role) -> AuthResponse {
        self.user_service
            .register(RegisterRequest {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: "Password123".to_string(),
                role: Some(role.as_str().to_string()),
            })
            .await
            .expect("registration failed")
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let response = self.send(method, uri, token, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }
}

pub fn txn(
    id: i64,
    date: &str,
    amount: f64,
    category: Category,
    status: TransactionStatus,
    user_id: &str,
) -> Transaction {
    let date = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc();
    Transaction {
        object_id: Some(ObjectId::new()),
        id,
        date: bson::DateTime::from_chrono(date),
        amount,
        category,
        status,
        user_id: user_id.to_string(),
        user_profile: format!("User {}", user_id),
        created_at: None,
        updated_at: None,
    }
}
