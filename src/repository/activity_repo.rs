use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::StreamExt;
use tracing::error;

use crate::config::mongo_conf::MongoConfig;
use crate::model::activity::ActivityEntry;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn insert(&self, entry: ActivityEntry) -> RepositoryResult<ActivityEntry>;
    /// Most recent entries first
    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<ActivityEntry>>;
}

pub struct MongoActivityRepository {
    collection: mongodb::Collection<ActivityEntry>,
}

impl MongoActivityRepository {
    pub async fn new(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        use mongodb::{
            options::{ClientOptions, Credential, ResolverConfig},
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
        let collection = db.collection::<ActivityEntry>("activity_log");

        let index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "timestamp": -1 })
            .build();
        collection.create_index(index, None).await?;

        Ok(MongoActivityRepository { collection })
    }
}

#[async_trait]
impl ActivityRepository for MongoActivityRepository {
    #[tracing::instrument(skip(self, entry), fields(action = %entry.action))]
    async fn insert(&self, mut entry: ActivityEntry) -> RepositoryResult<ActivityEntry> {
        entry.id = Some(ObjectId::new());
        match self.collection.insert_one(entry.clone(), None).await {
            Ok(_) => Ok(entry),
            Err(e) => {
                error!("Failed to record activity: {}", e);
                Err(e.into())
            }
        }
    }

    async fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<ActivityEntry>> {
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "timestamp": -1 })
            .limit(limit)
            .build();
        let mut cursor = self
            .collection
            .find(None, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list activity: {}", e)))?;
        let mut entries = Vec::new();
        while let Some(entry) = cursor.next().await {
            match entry {
                Ok(e) => entries.push(e),
                Err(e) => {
                    error!("Failed to deserialize activity entry: {}", e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize activity entry: {}",
                        e
                    )));
                }
            }
        }
        Ok(entries)
    }
}
