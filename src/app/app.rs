use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::app_conf::AppConfig;
use crate::config::jwt_conf::JwtConfig;
use crate::config::mongo_conf::MongoConfig;
use crate::config::seed_conf::SeedConfig;
use crate::dto::transaction_dto::parse_date_param;
use crate::handler::health_handler::HealthState;
use crate::middlewares::auth_middleware::AuthState;
use crate::model::transaction::{Category, Transaction, TransactionFilter, TransactionStatus};
use crate::model::user::Role;
use crate::repository::activity_repo::{ActivityRepository, MongoActivityRepository};
use crate::repository::transaction_repo::{MongoTransactionRepository, TransactionRepository};
use crate::repository::user_repo::{MongoUserRepository, UserRepository};
use crate::router::analytics_router::analytics_router;
use crate::router::auth_router::auth_router;
use crate::router::export_router::export_router;
use crate::router::health_router::health_router;
use crate::router::transaction_router::transaction_router;
use crate::service::analytics_service::AnalyticsServiceImpl;
use crate::service::export_service::ExportServiceImpl;
use crate::service::transaction_service::TransactionServiceImpl;
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::error::ServiceError;
use crate::util::jwt::JwtTokenUtilsImpl;

/// One record of the bulk-load file. `user_id` may arrive as a number or a
/// string depending on who produced the file.
#[derive(Debug, serde::Deserialize)]
struct SeedRecord {
    id: i64,
    date: String,
    amount: f64,
    category: String,
    status: String,
    user_id: serde_json::Value,
    user_profile: String,
}

impl SeedRecord {
    fn into_transaction(self) -> Result<Transaction, ServiceError> {
        use std::str::FromStr;

        let user_id = match self.user_id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Ok(Transaction {
            object_id: None,
            id: self.id,
            date: bson::DateTime::from_chrono(parse_date_param(&self.date)?),
            amount: self.amount,
            category: Category::from_str(&self.category).map_err(ServiceError::InvalidInput)?,
            status: TransactionStatus::from_str(&self.status).map_err(ServiceError::InvalidInput)?,
            user_id,
            user_profile: self.user_profile,
            created_at: None,
            updated_at: None,
        })
    }
}

pub struct App {
    config: AppConfig,
    router: Router,
    pub user_service: Arc<UserServiceImpl>,
    txn_repo: Arc<dyn TransactionRepository>,
    seed_config: SeedConfig,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env();
        let jwt_config = JwtConfig::from_env().expect("JWT config error");
        let mongo_config = MongoConfig::from_env().expect("Mongo config error");
        let seed_config = SeedConfig::from_env();

        let user_repo: Arc<dyn UserRepository> = Arc::new(
            MongoUserRepository::new(&mongo_config)
                .await
                .expect("User repo error"),
        );
        let txn_repo: Arc<dyn TransactionRepository> = Arc::new(
            MongoTransactionRepository::new(&mongo_config)
                .await
                .expect("Transaction repo error"),
        );
        let activity_repo: Arc<dyn ActivityRepository> = Arc::new(
            MongoActivityRepository::new(&mongo_config)
                .await
                .expect("Activity repo error"),
        );
        info!("✅ MongoDB repositories initialized");

        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let user_service = Arc::new(UserServiceImpl::new(
            user_repo.clone(),
            activity_repo.clone(),
            jwt_utils.clone(),
            seed_config.clone(),
        ));
        let txn_service = Arc::new(TransactionServiceImpl::new(
            txn_repo.clone(),
            activity_repo.clone(),
        ));
        let analytics_service = Arc::new(AnalyticsServiceImpl::new(txn_repo.clone()));
        let export_service = Arc::new(ExportServiceImpl::new(txn_repo.clone(), activity_repo));

        let auth_state = Arc::new(AuthState {
            jwt_utils,
            user_repo,
        });
        let health_state = Arc::new(HealthState {
            config: config.clone(),
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

        let app = App {
            config,
            router,
            user_service,
            txn_repo,
            seed_config,
        };
        app.seed_database().await;
        app
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(
            self.config.host.parse().expect("Invalid host"),
            self.config.port,
        );
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind address");
        axum::serve(listener, self.router)
            .await
            .expect("Failed to start server");
    }

    /// One-time bulk load plus default accounts; runs on every boot and
    /// no-ops when the data is already there.
    async fn seed_database(&self) {
        match self.txn_repo.count(&TransactionFilter::default()).await {
            Ok(0) => self.seed_transactions().await,
            Ok(count) => info!(
                "Transactions collection already has {} documents, skipping seed",
                count
            ),
            Err(e) => error!("Failed to check transaction count: {e}"),
        }
        self.seed_default_accounts().await;
    }

    async fn seed_transactions(&self) {
        let path = &self.seed_config.data_path;
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Seed data file {} not readable ({}), skipping transaction seed", path, e);
                return;
            }
        };
        let records: Vec<SeedRecord> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to parse seed data file {}: {}", path, e);
                return;
            }
        };

        let mut transactions = Vec::new();
        for record in records {
            match record.into_transaction() {
                Ok(txn) => transactions.push(txn),
                Err(e) => warn!("Skipping malformed seed record: {e}"),
            }
        }
        match self.txn_repo.insert_many(transactions).await {
            Ok(count) => info!("Seeded {} transactions", count),
            Err(e) => error!("Failed to seed transactions: {e}"),
        }
    }

    async fn seed_default_accounts(&self) {
        let seed = &self.seed_config;
        let accounts = [
            ("admin", &seed.admin_email, &seed.admin_password, Role::Admin),
            (
                "analyst",
                &seed.analyst_email,
                &seed.analyst_password,
                Role::Analyst,
            ),
            (
                "viewer",
                &seed.viewer_email,
                &seed.viewer_password,
                Role::Viewer,
            ),
        ];
        for (username, email, password, role) in accounts {
            if let Err(e) = self
                .user_service
                .ensure_default_user(username, email, password, role)
                .await
            {
                error!("Failed to provision default {} account: {e}", role);
            }
        }
    }
}
