// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value persistence trait used by the engine and the report sink.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::SegocError;
use crate::types::HealthStatus;

/// A string-keyed store of JSON string values.
///
/// Absence of a key is `Ok(None)`, never an error. Implementations must be
/// safe to share behind an `Arc` across tasks.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the human-readable name of this backend.
    fn name(&self) -> &str;

    /// Reports whether the backend can currently serve reads and writes.
    async fn health_check(&self) -> Result<HealthStatus, SegocError>;

    async fn get(&self, key: &str) -> Result<Option<String>, SegocError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), SegocError>;

    /// Removes a key. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<(), SegocError>;
}

/// Reads and decodes a JSON value stored under `key`.
pub async fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, SegocError>
where
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and stores it under `key`.
pub async fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), SegocError>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}
