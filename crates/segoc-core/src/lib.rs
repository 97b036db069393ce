// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for SEGOC site reporting.
//!
//! This crate provides the error types, the conversation and report domain
//! types, and the [`KeyValueStore`] trait that every persistence backend
//! implements.

pub mod error;
pub mod keys;
pub mod traits;
pub mod types;

pub use error::{FlowError, SegocError};
pub use traits::{KeyValueStore, load_json, save_json};
pub use types::{
    Author, CompletedReport, ConversationStep, DeliveryState, HealthStatus, MessageId,
    ReportDraft, ReportField, ReportStatus, SessionId, TranscriptMessage, WorkerIdentity,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    #[derive(Default)]
    struct MapStore(Mutex<HashMap<String, String>>);

    #[async_trait]
    impl KeyValueStore for MapStore {
        fn name(&self) -> &str {
            "map"
        }

        async fn health_check(&self) -> Result<HealthStatus, SegocError> {
            Ok(HealthStatus::Healthy)
        }

        async fn get(&self, key: &str) -> Result<Option<String>, SegocError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), SegocError> {
            self.0.lock().unwrap().insert(key.into(), value.into());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), SegocError> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[test]
    fn segoc_error_has_all_variants() {
        let _config = SegocError::Config("test".into());
        let _storage = SegocError::storage(std::io::Error::other("test"));
        let _flow = SegocError::from(FlowError::SessionClosed {
            step: ConversationStep::Finished,
        });
        let _export = SegocError::Export("no data".into());
        let _internal = SegocError::Internal("test".into());
    }

    #[test]
    fn flow_error_is_transparent() {
        let err = SegocError::from(FlowError::InvalidTransition {
            from: ConversationStep::ConfirmSite,
            to: ConversationStep::DeclareProgress,
        });
        assert_eq!(
            err.to_string(),
            "cannot move from `confirm-site` to `declare-progress`"
        );
    }

    #[test]
    fn storage_error_displays_source() {
        let err = SegocError::storage(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "storage error: disk full");
    }

    #[test]
    fn session_keys_exclude_reports() {
        assert!(!keys::SESSION_KEYS.contains(&keys::DASHBOARD_DATA));
    }

    #[tokio::test]
    async fn json_helpers_roundtrip_and_report_absence() {
        let store = MapStore::default();
        let missing: Option<u64> = load_json(&store, keys::DEMO_COUNTER).await.unwrap();
        assert!(missing.is_none());

        save_json(&store, keys::DEMO_COUNTER, &4u64).await.unwrap();
        let counter: Option<u64> = load_json(&store, keys::DEMO_COUNTER).await.unwrap();
        assert_eq!(counter, Some(4));
    }

    #[tokio::test]
    async fn load_json_surfaces_corrupt_values() {
        let store = MapStore::default();
        store.set(keys::DEMO_COUNTER, "not-json").await.unwrap();
        let result: Result<Option<u64>, _> = load_json(&store, keys::DEMO_COUNTER).await;
        assert!(matches!(result, Err(SegocError::Serialization(_))));
    }
}
