// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only collection of completed reports.
//!
//! The sink keeps an in-process mirror of the list stored under
//! `segoc-demo-data`. The mirror is loaded from the store on first use; until
//! that load succeeds the sink never writes, so an unreachable store cannot
//! cause previously persisted reports to be overwritten.

use std::sync::Arc;

use segoc_core::{CompletedReport, KeyValueStore, keys, load_json, save_json};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Where an appended report ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Written to the backing store.
    Persisted,
    /// Kept only in the process; the store was unavailable.
    MemoryOnly,
}

#[derive(Default)]
struct Mirror {
    reports: Vec<CompletedReport>,
    synced: bool,
}

pub struct ReportSink {
    store: Arc<dyn KeyValueStore>,
    mirror: Mutex<Mirror>,
}

impl ReportSink {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            mirror: Mutex::new(Mirror::default()),
        }
    }

    /// Loads the stored list if not yet done. Reports appended while the
    /// store was unreachable are kept after the stored ones.
    async fn sync(&self, mirror: &mut Mirror) {
        if mirror.synced {
            return;
        }
        match load_json::<Vec<CompletedReport>>(self.store.as_ref(), keys::DASHBOARD_DATA).await {
            Ok(stored) => {
                let pending = std::mem::take(&mut mirror.reports);
                mirror.reports = stored.unwrap_or_default();
                mirror.reports.extend(pending);
                mirror.synced = true;
                debug!(count = mirror.reports.len(), "report list loaded");
            }
            Err(e) => {
                warn!(error = %e, "report list unavailable, serving in-memory reports");
            }
        }
    }

    /// Appends a report. Never fails: store errors degrade to memory.
    pub async fn append(&self, report: CompletedReport) -> AppendOutcome {
        let mut mirror = self.mirror.lock().await;
        self.sync(&mut mirror).await;

        let session_id = report.session_id().clone();
        mirror.reports.push(report);

        if !mirror.synced {
            warn!(session_id = %session_id, "report kept in memory only");
            return AppendOutcome::MemoryOnly;
        }

        match save_json(self.store.as_ref(), keys::DASHBOARD_DATA, &mirror.reports).await {
            Ok(()) => {
                debug!(session_id = %session_id, total = mirror.reports.len(), "report appended");
                AppendOutcome::Persisted
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "report kept in memory only");
                AppendOutcome::MemoryOnly
            }
        }
    }

    /// Reports matching `predicate`, in insertion order.
    pub async fn query<F>(&self, predicate: F) -> Vec<CompletedReport>
    where
        F: Fn(&CompletedReport) -> bool,
    {
        let mut mirror = self.mirror.lock().await;
        self.sync(&mut mirror).await;
        mirror
            .reports
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    pub async fn all(&self) -> Vec<CompletedReport> {
        self.query(|_| true).await
    }

    pub async fn len(&self) -> usize {
        let mut mirror = self.mirror.lock().await;
        self.sync(&mut mirror).await;
        mirror.reports.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
