// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event payloads carried by the bus.

use chrono::{DateTime, Utc};
use segoc_core::{CompletedReport, ConversationStep, SessionId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusEvent {
    /// A session opened with a fresh worker identity.
    SessionStarted {
        session_id: SessionId,
        worker_name: String,
    },
    /// A session was cancelled before finishing.
    SessionCancelled {
        session_id: SessionId,
        at_step: ConversationStep,
    },
    /// A report was frozen and handed to the sink.
    ReportCompleted { report: CompletedReport },
}

impl BusEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            BusEvent::SessionStarted { session_id, .. }
            | BusEvent::SessionCancelled { session_id, .. } => session_id,
            BusEvent::ReportCompleted { report } => report.session_id(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BusEvent::SessionStarted { .. } => "session_started",
            BusEvent::SessionCancelled { .. } => "session_cancelled",
            BusEvent::ReportCompleted { .. } => "report_completed",
        }
    }
}

/// An event stamped with an id and emission time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub id: String,
    pub emitted_at: DateTime<Utc>,
    pub event: BusEvent,
}

impl Envelope {
    pub fn new(event: BusEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            emitted_at: Utc::now(),
            event,
        }
    }
}
