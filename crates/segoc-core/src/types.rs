// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the conversation engine, the report sink and the dashboard.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FlowError;

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh random session identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a transcript message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generates a fresh random message identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by store health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Store is fully operational.
    Healthy,
    /// Store is operational but experiencing issues.
    Degraded(String),
    /// Store is not operational.
    Unhealthy(String),
}

/// One stage of the fixed reporting conversation.
///
/// Active steps are listed in their canonical order; `Finished` and
/// `Cancelled` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ConversationStep {
    /// Greeting; the worker says whether they are on site.
    Start,
    /// Asks which site the worker is at.
    ConfirmSite,
    /// Asks which sector of the site.
    ConfirmSector,
    /// Asks what work was done.
    DeclareActivity,
    /// Asks the percent complete.
    DeclareProgress,
    /// Asks for material expenses of the day.
    DeclareExpenses,
    /// The report was recorded.
    Finished,
    /// The worker declined to report.
    Cancelled,
}

impl ConversationStep {
    /// Active steps in canonical order.
    pub const ACTIVE: [ConversationStep; 6] = [
        ConversationStep::Start,
        ConversationStep::ConfirmSite,
        ConversationStep::ConfirmSector,
        ConversationStep::DeclareActivity,
        ConversationStep::DeclareProgress,
        ConversationStep::DeclareExpenses,
    ];

    /// Whether the session accepts no further input.
    pub fn is_terminal(self) -> bool {
        matches!(self, ConversationStep::Finished | ConversationStep::Cancelled)
    }

    /// Position in the canonical sequence, `None` for terminal steps.
    pub fn position(self) -> Option<usize> {
        Self::ACTIVE.iter().position(|s| *s == self)
    }

    /// The step that follows this one on the canonical path.
    pub fn successor(self) -> Option<ConversationStep> {
        match self {
            ConversationStep::Start => Some(ConversationStep::ConfirmSite),
            ConversationStep::ConfirmSite => Some(ConversationStep::ConfirmSector),
            ConversationStep::ConfirmSector => Some(ConversationStep::DeclareActivity),
            ConversationStep::DeclareActivity => Some(ConversationStep::DeclareProgress),
            ConversationStep::DeclareProgress => Some(ConversationStep::DeclareExpenses),
            ConversationStep::DeclareExpenses => Some(ConversationStep::Finished),
            ConversationStep::Finished | ConversationStep::Cancelled => None,
        }
    }

    /// The report field written when leaving this step.
    pub fn field(self) -> Option<ReportField> {
        match self {
            ConversationStep::ConfirmSite => Some(ReportField::Site),
            ConversationStep::ConfirmSector => Some(ReportField::Sector),
            ConversationStep::DeclareActivity => Some(ReportField::Activity),
            ConversationStep::DeclareProgress => Some(ReportField::Progress),
            ConversationStep::DeclareExpenses => Some(ReportField::Expenses),
            _ => None,
        }
    }
}

/// A structured field of the daily report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    Site,
    Sector,
    Activity,
    Progress,
    Expenses,
}

impl ReportField {
    /// Every field, in the order the conversation collects them.
    pub const ALL: [ReportField; 5] = [
        ReportField::Site,
        ReportField::Sector,
        ReportField::Activity,
        ReportField::Progress,
        ReportField::Expenses,
    ];
}

/// Who wrote a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Author {
    Bot,
    User,
}

/// Cosmetic delivery receipt of a user message.
///
/// Ordered: a message only ever moves forward through these states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    Sending,
    Sent,
    Delivered,
    Read,
}

impl DeliveryState {
    /// The following receipt state, `None` once read.
    pub fn next(self) -> Option<DeliveryState> {
        match self {
            DeliveryState::Sending => Some(DeliveryState::Sent),
            DeliveryState::Sent => Some(DeliveryState::Delivered),
            DeliveryState::Delivered => Some(DeliveryState::Read),
            DeliveryState::Read => None,
        }
    }
}

/// One displayed line of the chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    /// Unique message identifier, targeted by receipt ticks.
    pub id: MessageId,
    pub author: Author,
    /// Message body as displayed.
    pub text: String,
    /// When the message was appended.
    pub sent_at: DateTime<Utc>,
    /// Receipt state; only meaningful for user messages.
    pub delivery: DeliveryState,
}

impl TranscriptMessage {
    /// Bot messages are shown as delivered right away.
    pub fn bot(text: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            id: MessageId::generate(),
            author: Author::Bot,
            text: text.into(),
            sent_at,
            delivery: DeliveryState::Delivered,
        }
    }

    /// User messages start as `Sending` and advance through receipt ticks.
    pub fn user(text: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            id: MessageId::generate(),
            author: Author::User,
            text: text.into(),
            sent_at,
            delivery: DeliveryState::Sending,
        }
    }

    /// Moves the receipt forward. Returns `false` when `to` is not ahead of
    /// the current state.
    pub fn advance_delivery(&mut self, to: DeliveryState) -> bool {
        if to > self.delivery {
            self.delivery = to;
            true
        } else {
            false
        }
    }
}

/// Synthetic identity assigned to a demo session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerIdentity {
    /// Stable id, unique per session.
    pub worker_id: String,
    /// Display name, e.g. `Usuario Demo 3`.
    pub worker_name: String,
}

impl WorkerIdentity {
    /// Builds `{prefix} {counter}` / `demo_{counter}_{millis}`.
    pub fn demo(counter: u64, name_prefix: &str, now: DateTime<Utc>) -> Self {
        Self {
            worker_id: format!("demo_{counter}_{}", now.timestamp_millis()),
            worker_name: format!("{name_prefix} {counter}"),
        }
    }
}

/// The in-progress report of one conversation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDraft {
    session_id: SessionId,
    worker_id: String,
    worker_name: String,
    /// Contact phone shown on the report.
    phone: String,
    /// Collected answers; `None` until their step is completed.
    #[serde(default)]
    site: Option<String>,
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    activity: Option<String>,
    #[serde(default)]
    progress: Option<String>,
    #[serde(default)]
    expenses: Option<String>,
    /// Calendar date of `start_time`.
    date: NaiveDate,
    /// When the session started.
    start_time: DateTime<Utc>,
    /// Stamped by [`ReportDraft::freeze`].
    #[serde(default)]
    end_time: Option<DateTime<Utc>>,
}

impl ReportDraft {
    /// Creates an empty draft for a session starting at `start_time`.
    pub fn new(
        session_id: SessionId,
        identity: WorkerIdentity,
        phone: impl Into<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            worker_id: identity.worker_id,
            worker_name: identity.worker_name,
            phone: phone.into(),
            site: None,
            sector: None,
            activity: None,
            progress: None,
            expenses: None,
            date: start_time.date_naive(),
            start_time,
            end_time: None,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Set once the draft has been frozen.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Returns a collected field, treating blank values as unset.
    pub fn field(&self, field: ReportField) -> Option<&str> {
        let value = match field {
            ReportField::Site => &self.site,
            ReportField::Sector => &self.sector,
            ReportField::Activity => &self.activity,
            ReportField::Progress => &self.progress,
            ReportField::Expenses => &self.expenses,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    /// Writes a field, replacing any earlier answer.
    pub fn set_field(&mut self, field: ReportField, value: impl Into<String>) {
        let slot = match field {
            ReportField::Site => &mut self.site,
            ReportField::Sector => &mut self.sector,
            ReportField::Activity => &mut self.activity,
            ReportField::Progress => &mut self.progress,
            ReportField::Expenses => &mut self.expenses,
        };
        *slot = Some(value.into());
    }

    /// Fields still unset or blank, in collection order.
    pub fn missing_fields(&self) -> Vec<ReportField> {
        ReportField::ALL
            .into_iter()
            .filter(|f| self.field(*f).is_none())
            .collect()
    }

    /// Snapshots the draft into an immutable report, stamping `end_time`.
    ///
    /// `end_time` is clamped so it never precedes `start_time`.
    pub fn freeze(&mut self, finished_at: DateTime<Utc>) -> Result<CompletedReport, FlowError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(FlowError::IncompleteReport { missing });
        }
        let end_time = finished_at.max(self.start_time);
        self.end_time = Some(end_time);

        let value = |f: ReportField| self.field(f).unwrap_or_default().to_string();
        Ok(CompletedReport {
            session_id: self.session_id.clone(),
            worker_id: self.worker_id.clone(),
            worker_name: self.worker_name.clone(),
            phone: self.phone.clone(),
            site: value(ReportField::Site),
            sector: value(ReportField::Sector),
            activity: value(ReportField::Activity),
            progress: value(ReportField::Progress),
            expenses: value(ReportField::Expenses),
            date: self.date,
            start_time: self.start_time,
            end_time,
            timestamp: end_time,
            status: ReportStatus::Completed,
        })
    }
}

/// Status carried by every completed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Completed,
}

impl ReportStatus {
    /// Label shown on the dashboard and in exports.
    pub fn label(self) -> &'static str {
        match self {
            ReportStatus::Completed => "Completado",
        }
    }
}

/// Immutable snapshot of a finished draft, as stored by the report sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedReport {
    session_id: SessionId,
    worker_id: String,
    worker_name: String,
    phone: String,
    site: String,
    sector: String,
    activity: String,
    /// Free text, usually a percentage such as `75%`.
    progress: String,
    /// Free text; amounts are written as `$40.000`.
    expenses: String,
    date: NaiveDate,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    /// Completion instant, equal to `end_time`.
    timestamp: DateTime<Utc>,
    status: ReportStatus,
}

impl CompletedReport {
    /// Session that produced the report.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Synthetic worker id of the session.
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Display name of the reporting worker.
    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }

    /// Contact phone of the worker.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Construction site name.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Sector within the site.
    pub fn sector(&self) -> &str {
        &self.sector
    }

    /// Work performed during the day.
    pub fn activity(&self) -> &str {
        &self.activity
    }

    /// Progress as typed or selected.
    pub fn progress(&self) -> &str {
        &self.progress
    }

    /// Material expenses as typed or selected.
    pub fn expenses(&self) -> &str {
        &self.expenses
    }

    /// Report date, taken from the session start.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// When the session started.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// When the last answer was given. Never before `start_time`.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    /// Completion instant used for sorting and display.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Always [`ReportStatus::Completed`].
    pub fn status(&self) -> ReportStatus {
        self.status
    }

    /// Value of one collected field.
    pub fn field(&self, field: ReportField) -> &str {
        match field {
            ReportField::Site => &self.site,
            ReportField::Sector => &self.sector,
            ReportField::Activity => &self.activity,
            ReportField::Progress => &self.progress,
            ReportField::Expenses => &self.expenses,
        }
    }
}
