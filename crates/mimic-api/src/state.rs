//! Application state wiring the infra adapters to the core services.
//!
//! `AppState` owns the database pool and the configuration. Model stores and
//! dispatchers are built from it per command, pinned to the SQLite adapters.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use mimic_core::dispatch::Dispatcher;
use mimic_core::markov::ModelOptions;
use mimic_core::outbound::MessageSink;
use mimic_core::storage::ModelStore;
use mimic_core::storage::model_store::DEFAULT_CACHE_CAPACITY;
use mimic_infra::config::load_config;
use mimic_infra::filesystem::resolve_data_dir;
use mimic_infra::sqlite::{DatabasePool, SqliteKvStore, SqliteUserDirectory};
use mimic_types::config::ImpersonateConfig;

/// Model store pinned to the SQLite key-value adapter.
pub type ConcreteModelStore = ModelStore<SqliteKvStore>;

/// Dispatcher pinned to the SQLite adapters and the given sink.
pub type ConcreteDispatcher<S> = Dispatcher<SqliteKvStore, SqliteUserDirectory, S>;

/// Shared application state.
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: ImpersonateConfig,
    pub db_pool: DatabasePool,
    pub kv_store: SqliteKvStore,
    pub directory: SqliteUserDirectory,
}

impl AppState {
    /// Initialize from the default data directory.
    pub async fn init() -> anyhow::Result<Self> {
        Self::init_in(resolve_data_dir()).await
    }

    /// Load configuration and open the database inside `data_dir`.
    ///
    /// Opening the database (including migrations) is bounded by
    /// `init_timeout_ms`; exceeding it aborts startup.
    pub async fn init_in(data_dir: PathBuf) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let (config, _fallbacks) = load_config(&data_dir).await;

        let timeout = Duration::from_millis(config.init_timeout_ms);
        let db_pool = tokio::time::timeout(timeout, DatabasePool::open_in(&data_dir))
            .await
            .map_err(|_| {
                anyhow!(
                    "Timed out after {}ms opening the model database in {}",
                    config.init_timeout_ms,
                    data_dir.display()
                )
            })?
            .context("Failed to open the model database")?;

        tracing::debug!(data_dir = %data_dir.display(), mode = %config.mode, "application state ready");

        Ok(Self {
            kv_store: SqliteKvStore::new(db_pool.clone()),
            directory: SqliteUserDirectory::new(db_pool.clone()),
            data_dir,
            config,
            db_pool,
        })
    }

    /// A fresh model store over the persistent key-value store.
    pub fn model_store(&self) -> ConcreteModelStore {
        let capacity = std::num::NonZeroUsize::new(self.config.model_cache_capacity)
            .unwrap_or(DEFAULT_CACHE_CAPACITY);
        ModelStore::new(
            self.kv_store.clone(),
            ModelOptions::from_config(&self.config),
            capacity,
        )
    }

    /// A dispatcher delivering through `sink`.
    pub fn dispatcher<S: MessageSink>(&self, sink: Arc<S>) -> ConcreteDispatcher<S> {
        Dispatcher::new(
            self.config.clone(),
            self.kv_store.clone(),
            self.directory.clone(),
            sink,
        )
    }
}
