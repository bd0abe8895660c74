//! Key-value storage types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Namespace prefix for persisted text models.
pub const MODEL_KEY_PREFIX: &str = "model:";

/// Storage key for a user's text model: `model:<user_id>`.
pub fn model_key(user_id: &str) -> String {
    format!("{MODEL_KEY_PREFIX}{user_id}")
}

/// Recover the user id from a model storage key.
pub fn user_id_from_model_key(key: &str) -> Option<&str> {
    key.strip_prefix(MODEL_KEY_PREFIX)
}

/// A key-value entry in the persistent KV store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
