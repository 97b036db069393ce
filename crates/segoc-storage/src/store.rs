// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `KeyValueStore` backends: SQLite and in-memory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use segoc_config::model::{StorageBackend, StorageConfig};
use segoc_core::{HealthStatus, KeyValueStore, SegocError};
use tokio::sync::RwLock;
use tracing::debug;

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed store. One row of `kv_store` per key.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub async fn open(config: &StorageConfig) -> Result<Self, SegocError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        Ok(Self { db })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn keys(&self) -> Result<Vec<String>, SegocError> {
        queries::kv::list_keys(&self.db).await
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn health_check(&self) -> Result<HealthStatus, SegocError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SegocError> {
        queries::kv::get_value(&self.db, key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SegocError> {
        queries::kv::put_value(&self.db, key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), SegocError> {
        queries::kv::delete_value(&self.db, key).await
    }
}

/// Process-local store. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> Result<HealthStatus, SegocError> {
        Ok(HealthStatus::Healthy)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SegocError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SegocError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SegocError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Builds the store selected by `[storage] backend`.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, SegocError> {
    let store: Arc<dyn KeyValueStore> = match config.backend {
        StorageBackend::Sqlite => Arc::new(SqliteStore::open(config).await?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    debug!(backend = store.name(), "key-value store ready");
    Ok(store)
}
