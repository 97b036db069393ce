// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` wires a key-value store, the report sink and the event bus
//! the way the binary does, and opens conversation engines over them.

use std::sync::Arc;
use std::time::Duration;

use segoc_agent::flow::ON_SITE_LABEL;
use segoc_agent::{ConversationEngine, EngineSettings, TurnOutcome};
use segoc_bus::EventBus;
use segoc_config::model::{StorageBackend, StorageConfig};
use segoc_core::{CompletedReport, FlowError, KeyValueStore, SegocError};
use segoc_storage::{MemoryStore, ReportSink, SqliteStore};
use tempfile::TempDir;

use crate::failing_store::FailingStore;

enum Backend {
    Memory,
    Sqlite,
    Failing,
}

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    backend: Backend,
    settings: EngineSettings,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            backend: Backend::Memory,
            settings: EngineSettings::default(),
        }
    }

    /// Use a SQLite database in a temporary directory.
    pub fn with_sqlite(mut self) -> Self {
        self.backend = Backend::Sqlite;
        self
    }

    /// Use a [`FailingStore`], reachable through [`TestHarness::failing`].
    pub fn with_failing_store(mut self) -> Self {
        self.backend = Backend::Failing;
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_receipt_tick(mut self, tick: Duration) -> Self {
        self.settings.receipt_tick = tick;
        self
    }

    pub async fn build(self) -> Result<TestHarness, SegocError> {
        let mut temp_dir = None;
        let mut failing = None;

        let store: Arc<dyn KeyValueStore> = match self.backend {
            Backend::Memory => Arc::new(MemoryStore::new()),
            Backend::Sqlite => {
                let dir = TempDir::new().map_err(SegocError::storage)?;
                let config = StorageConfig {
                    backend: StorageBackend::Sqlite,
                    database_path: dir.path().join("segoc.db").display().to_string(),
                    wal_mode: true,
                };
                let store = SqliteStore::open(&config).await?;
                temp_dir = Some(dir);
                Arc::new(store)
            }
            Backend::Failing => {
                let store = Arc::new(FailingStore::new());
                failing = Some(store.clone());
                store
            }
        };

        Ok(TestHarness {
            sink: Arc::new(ReportSink::new(store.clone())),
            store,
            failing,
            bus: EventBus::default(),
            settings: self.settings,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment around one store.
pub struct TestHarness {
    pub store: Arc<dyn KeyValueStore>,
    /// Set when built with [`TestHarnessBuilder::with_failing_store`].
    pub failing: Option<Arc<FailingStore>>,
    pub sink: Arc<ReportSink>,
    pub bus: EventBus,
    pub settings: EngineSettings,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: Option<TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Opens an engine, restoring whatever session the store holds.
    pub async fn engine(&self) -> ConversationEngine {
        ConversationEngine::open(
            self.store.clone(),
            self.sink.clone(),
            self.bus.clone(),
            self.settings.clone(),
        )
        .await
    }

    /// A second sink over the same store, as a restarted process would see it.
    pub fn reopened_sink(&self) -> ReportSink {
        ReportSink::new(self.store.clone())
    }

    /// Runs `script` on a fresh engine and returns the recorded report.
    pub async fn complete(&self, script: &ReportScript) -> Result<CompletedReport, FlowError> {
        let mut engine = self.engine().await;
        script.run(&mut engine).await
    }
}

/// Answers for one full reporting session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportScript {
    pub site: String,
    pub sector: String,
    pub activity: String,
    pub progress: String,
    pub expenses: String,
}

impl Default for ReportScript {
    fn default() -> Self {
        Self {
            site: "Obra Centro Comercial".to_string(),
            sector: "Sector A - Planta Baja".to_string(),
            activity: "Pintura".to_string(),
            progress: "75%".to_string(),
            expenses: "No hubo gastos hoy".to_string(),
        }
    }
}

impl ReportScript {
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = site.into();
        self
    }

    pub fn progress(mut self, progress: impl Into<String>) -> Self {
        self.progress = progress.into();
        self
    }

    pub fn expenses(mut self, expenses: impl Into<String>) -> Self {
        self.expenses = expenses.into();
        self
    }

    /// Walks `engine` from `start` to `finished`.
    ///
    /// Progress and expenses are typed; every other answer is a button.
    pub async fn run(&self, engine: &mut ConversationEngine) -> Result<CompletedReport, FlowError> {
        let buttons = [
            ON_SITE_LABEL,
            self.site.as_str(),
            self.sector.as_str(),
            self.activity.as_str(),
        ];
        for label in buttons {
            let step = engine.step();
            let next = step.successor().ok_or(FlowError::SessionClosed { step })?;
            engine.select_option(label, next, step.field()).await?;
        }
        engine.send_text(&self.progress).await?;
        match engine.send_text(&self.expenses).await? {
            TurnOutcome::Completed(report) => Ok(report),
            _ => Err(FlowError::IncompleteReport {
                missing: engine.draft().missing_fields(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segoc_core::ConversationStep;

    #[tokio::test]
    async fn default_script_completes_a_report() {
        let harness = TestHarness::builder().build().await.unwrap();
        let report = harness.complete(&ReportScript::default()).await.unwrap();
        assert_eq!(report.site(), "Obra Centro Comercial");
        assert_eq!(report.progress(), "75%");
        assert_eq!(harness.sink.len().await, 1);
    }

    #[tokio::test]
    async fn sqlite_harness_persists_between_sinks() {
        let harness = TestHarness::builder().with_sqlite().build().await.unwrap();
        harness
            .complete(&ReportScript::default().site("Obra Industrial Sur"))
            .await
            .unwrap();

        let reports = harness.reopened_sink().all().await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].site(), "Obra Industrial Sur");
        assert_eq!(harness.store.name(), "sqlite");
    }

    #[tokio::test]
    async fn script_stops_on_a_closed_session() {
        let harness = TestHarness::builder().build().await.unwrap();
        let mut engine = harness.engine().await;
        ReportScript::default().run(&mut engine).await.unwrap();
        assert_eq!(engine.step(), ConversationStep::Finished);

        let err = ReportScript::default().run(&mut engine).await.unwrap_err();
        assert_eq!(
            err,
            FlowError::SessionClosed {
                step: ConversationStep::Finished
            }
        );
    }
}
