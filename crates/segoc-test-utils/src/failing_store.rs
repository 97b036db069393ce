// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value store with switchable failures.
//!
//! `FailingStore` wraps a [`MemoryStore`]. Reads and writes can be made to
//! fail independently, which lets tests observe how the engine and the
//! report sink degrade when persistence is unavailable.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use segoc_core::{HealthStatus, KeyValueStore, SegocError};
use segoc_storage::MemoryStore;

#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    rejected: AtomicUsize,
}

impl FailingStore {
    /// A store that works until told otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every read and write fails.
    pub fn broken() -> Self {
        let store = Self::new();
        store.fail_reads(true);
        store.fail_writes(true);
        store
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of operations refused so far.
    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }

    fn check(&self, flag: &AtomicBool, op: &str, key: &str) -> Result<(), SegocError> {
        if flag.load(Ordering::SeqCst) {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(SegocError::storage(std::io::Error::other(format!(
                "{op} of `{key}` refused by test store"
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    fn name(&self) -> &str {
        "failing"
    }

    async fn health_check(&self) -> Result<HealthStatus, SegocError> {
        let broken = self.fail_reads.load(Ordering::SeqCst) || self.fail_writes.load(Ordering::SeqCst);
        Ok(if broken {
            HealthStatus::Unhealthy("failures injected".to_string())
        } else {
            HealthStatus::Healthy
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SegocError> {
        self.check(&self.fail_reads, "read", key)?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SegocError> {
        self.check(&self.fail_writes, "write", key)?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), SegocError> {
        self.check(&self.fail_writes, "remove", key)?;
        self.inner.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failures_can_be_toggled() {
        let store = FailingStore::new();
        store.set("k", "v").await.unwrap();

        store.fail_writes(true);
        assert!(store.set("k", "w").await.is_err());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.fail_reads(true);
        assert!(store.get("k").await.is_err());
        assert_eq!(store.rejected(), 2);
        assert!(matches!(
            store.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));

        store.fail_reads(false);
        store.fail_writes(false);
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }
}
