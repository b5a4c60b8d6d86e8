use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Append-only audit record. Entries are written when a user logs in,
/// registers, mutates a transaction or exports data, and are never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub username: String,
    pub action: String,
    pub details: String,
    pub timestamp: bson::DateTime,
}
