//! Per-user text model store with a bounded in-process cache.
//!
//! Models are loaded lazily from the `KvStore` under `model:<user_id>` and kept
//! in an LRU cache. Every accepted training sample is written through
//! immediately, so an evicted model can always be reloaded without loss.

use std::num::NonZeroUsize;

use lru::LruCache;
use mimic_types::error::{ModelError, RepositoryError};
use mimic_types::model::ChainState;
use mimic_types::storage::model_key;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use super::kv_store::KvStore;
use crate::markov::{ModelOptions, TextModel};

/// Default number of models kept in memory.
pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Errors that cannot be degraded to "no prior training".
#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Encode a chain state for persistence.
pub fn encode_state(state: &ChainState) -> Result<serde_json::Value, ModelError> {
    serde_json::to_value(state).map_err(|e| ModelError::Encode(e.to_string()))
}

/// Decode a persisted chain state.
pub fn decode_state(value: serde_json::Value) -> Result<ChainState, ModelError> {
    serde_json::from_value(value).map_err(|e| ModelError::Decode(e.to_string()))
}

/// Loads, caches and persists one `TextModel` per user.
pub struct ModelStore<K> {
    kv: K,
    options: ModelOptions,
    cache: LruCache<String, TextModel>,
}

impl<K: KvStore> ModelStore<K> {
    pub fn new(kv: K, options: ModelOptions, capacity: NonZeroUsize) -> Self {
        Self {
            kv,
            options,
            cache: LruCache::new(capacity),
        }
    }

    /// Access the underlying key-value store.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Number of models currently held in memory.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Whether `user_id`'s model is currently held in memory.
    pub fn is_cached(&self, user_id: &str) -> bool {
        self.cache.contains(user_id)
    }

    /// Return the model for `user_id`, loading it on a cache miss.
    ///
    /// A missing or undecodable stored value yields an empty model. A failed
    /// read is returned as an error: caching an empty model in that case would
    /// let the next write-through overwrite the stored one.
    pub async fn get_model(&mut self, user_id: &str) -> Result<&mut TextModel, ModelStoreError> {
        if !self.cache.contains(user_id) {
            let model = self.load(user_id).await?;
            if let Some((evicted, _)) = self.cache.push(user_id.to_string(), model) {
                if evicted != user_id {
                    debug!(user_id = %evicted, "evicted text model from cache");
                }
            }
        }

        let options = self.options;
        Ok(self
            .cache
            .get_or_insert_mut(user_id.to_string(), || TextModel::new(options)))
    }

    /// Persist `model` under `user_id`'s key.
    pub async fn save_model(&self, user_id: &str, model: &TextModel) -> Result<(), ModelStoreError> {
        self.persist(user_id, &model.export_state()).await
    }

    /// Train `user_id`'s model on `text` and write it through.
    ///
    /// Returns whether the sample was accepted. Rejected samples (too short)
    /// cause no write.
    pub async fn train(&mut self, user_id: &str, text: &str) -> Result<bool, ModelStoreError> {
        let model = self.get_model(user_id).await?;
        if !model.train(text) {
            return Ok(false);
        }
        let state = model.export_state();
        self.persist(user_id, &state).await?;
        Ok(true)
    }

    /// Train `user_id`'s model on every sample, then write it through once.
    ///
    /// Returns the number of accepted samples. Nothing is written when none
    /// were accepted.
    pub async fn train_batch<I, T>(&mut self, user_id: &str, samples: I) -> Result<usize, ModelStoreError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let model = self.get_model(user_id).await?;
        let accepted = samples
            .into_iter()
            .filter(|sample| model.train(sample.as_ref()))
            .count();
        if accepted == 0 {
            return Ok(0);
        }
        let state = model.export_state();
        self.persist(user_id, &state).await?;
        debug!(user_id, accepted, "batch trained text model");
        Ok(accepted)
    }

    /// Generate a response from `user_id`'s model.
    pub async fn respond(
        &mut self,
        user_id: &str,
        seed: &str,
        rng: &mut impl Rng,
    ) -> Result<String, ModelStoreError> {
        let model = self.get_model(user_id).await?;
        Ok(model.respond_with(seed, rng))
    }

    async fn load(&self, user_id: &str) -> Result<TextModel, ModelStoreError> {
        let Some(value) = self.kv.get(&model_key(user_id)).await? else {
            debug!(user_id, "no stored text model, starting empty");
            return Ok(TextModel::new(self.options));
        };

        match decode_state(value) {
            Ok(state) => Ok(TextModel::from_state(self.options, state)),
            Err(e) => {
                info!(user_id, error = %e, "discarding unreadable text model, starting empty");
                Ok(TextModel::new(self.options))
            }
        }
    }

    async fn persist(&self, user_id: &str, state: &ChainState) -> Result<(), ModelStoreError> {
        let value = encode_state(state)?;
        self.kv.set(&model_key(user_id), &value).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryKvStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn store(capacity: usize) -> ModelStore<MemoryKvStore> {
        ModelStore::new(
            MemoryKvStore::new(),
            ModelOptions::default(),
            NonZeroUsize::new(capacity).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_first_access_creates_empty_model() {
        let mut store = store(4);
        let model = store.get_model("U1").await.unwrap();
        assert!(model.is_empty());
        assert!(store.is_cached("U1"));
        // Merely reading does not write anything.
        assert!(store.kv().value("model:U1").is_none());
    }

    #[tokio::test]
    async fn test_train_writes_through() {
        let mut store = store(4);
        assert!(store.train("U1", "hello there friend").await.unwrap());

        let stored = store.kv().value("model:U1").unwrap();
        let state = decode_state(stored).unwrap();
        assert_eq!(state.transition_count(), 4);
    }

    #[tokio::test]
    async fn test_rejected_sample_is_not_written() {
        let mut store = ModelStore::new(
            MemoryKvStore::new(),
            ModelOptions {
                min_words: 5,
                ..ModelOptions::default()
            },
            NonZeroUsize::new(4).unwrap(),
        );
        assert!(!store.train("U1", "too short").await.unwrap());
        assert!(store.kv().value("model:U1").is_none());
    }

    #[tokio::test]
    async fn test_train_batch_writes_once() {
        let mut store = ModelStore::new(
            MemoryKvStore::new(),
            ModelOptions {
                min_words: 2,
                ..ModelOptions::default()
            },
            NonZeroUsize::new(4).unwrap(),
        );
        let accepted = store
            .train_batch("U1", ["one", "two words", "three more words"])
            .await
            .unwrap();
        assert_eq!(accepted, 2);

        let state = decode_state(store.kv().value("model:U1").unwrap()).unwrap();
        assert_eq!(state.transition_count(), 7);

        assert_eq!(store.train_batch("U2", ["nope"]).await.unwrap(), 0);
        assert!(store.kv().value("model:U2").is_none());
    }

    #[tokio::test]
    async fn test_corrupt_stored_model_degrades_to_empty() {
        let kv = MemoryKvStore::new();
        kv.insert("model:U1", serde_json::json!("definitely not a chain"));
        let mut store = ModelStore::new(kv, ModelOptions::default(), NonZeroUsize::new(4).unwrap());

        let model = store.get_model("U1").await.unwrap();
        assert!(model.is_empty());
        assert_eq!(model.respond("anything"), "");
    }

    #[tokio::test]
    async fn test_read_failure_is_reported_not_cached() {
        let mut store = store(4);
        store.kv().set_fail_reads(true);
        assert!(matches!(
            store.get_model("U1").await,
            Err(ModelStoreError::Repository(RepositoryError::Connection))
        ));
        assert!(!store.is_cached("U1"));
    }

    #[tokio::test]
    async fn test_write_failure_keeps_in_memory_training() {
        let mut store = store(4);
        store.kv().set_fail_writes(true);
        assert!(store.train("U1", "still learned this").await.is_err());
        assert!(!store.get_model("U1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_eviction_reloads_from_storage() {
        let mut store = store(2);
        store.train("U1", "first user words").await.unwrap();
        store.train("U2", "second user words").await.unwrap();
        store.train("U3", "third user words").await.unwrap();

        assert_eq!(store.cached_len(), 2);
        assert!(!store.is_cached("U1"));

        let mut rng = StdRng::seed_from_u64(9);
        let response = store.respond("U1", "", &mut rng).await.unwrap();
        assert_eq!(response, "first user words");
        assert!(store.is_cached("U1"));
    }

    #[tokio::test]
    async fn test_save_model_roundtrip() {
        let mut model = TextModel::new(ModelOptions::default());
        model.train("saved from elsewhere");

        let mut store = store(2);
        store.save_model("U9", &model).await.unwrap();

        let mut fresh = ModelStore::new(
            MemoryKvStore::new(),
            ModelOptions::default(),
            NonZeroUsize::new(2).unwrap(),
        );
        fresh
            .kv()
            .insert("model:U9", store.kv().value("model:U9").unwrap());
        assert_eq!(*fresh.get_model("U9").await.unwrap(), model);
    }
}
