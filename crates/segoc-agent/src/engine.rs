// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation engine: one reporting session at a time.
//!
//! The engine owns the current state, the draft and the transcript. Every
//! accepted input is validated by [`flow::transition`] first and only then
//! committed, so a rejected input leaves the engine exactly as it was.
//! Persistence is best effort: store failures are logged and the session
//! carries on in memory.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use segoc_bus::{BusEvent, EventBus};
use segoc_config::SegocConfig;
use segoc_core::{
    CompletedReport, ConversationStep, FlowError, KeyValueStore, ReportDraft, ReportField,
    SessionId, TranscriptMessage, WorkerIdentity, keys, load_json, save_json,
};
use segoc_storage::{AppendOutcome, ReportSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::flow::{
    self, ConversationState, FlowAction, FlowEvent, MenuCatalog, ReplyAction, ReplyOption,
};
use crate::receipts::{ReceiptScheduler, ReceiptTick};

/// Engine knobs, usually taken from [`SegocConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub phone: String,
    pub worker_name_prefix: String,
    pub catalog: MenuCatalog,
    pub receipt_tick: Duration,
}

impl From<&SegocConfig> for EngineSettings {
    fn from(config: &SegocConfig) -> Self {
        Self {
            phone: config.demo.phone.clone(),
            worker_name_prefix: config.demo.worker_name_prefix.clone(),
            catalog: MenuCatalog::from(&config.demo),
            receipt_tick: Duration::from_millis(config.pacing.receipt_tick_ms),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&SegocConfig::default())
    }
}

/// What an accepted input did.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Moved forward to this step.
    Advanced(ConversationStep),
    /// Jumped back to this step.
    Rewound(ConversationStep),
    /// The free-text input is open.
    AwaitingText,
    /// The free-text input was closed without sending.
    OptionsShown,
    /// The session ended without a report.
    Cancelled,
    /// The session ended with this report.
    Completed(CompletedReport),
    /// Empty input; nothing changed.
    Ignored,
}

/// Whether the user picks from the menu or types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Options,
    FreeText { placeholder: &'static str },
}

/// Stored form of the active session under `segoc-chat-data`.
///
/// The step is kept as a plain string so that an unknown value degrades to
/// `start` instead of discarding the whole draft.
#[derive(Serialize, Deserialize)]
struct SavedChat {
    step: String,
    #[serde(flatten)]
    draft: ReportDraft,
}

pub struct ConversationEngine {
    store: Arc<dyn KeyValueStore>,
    sink: Arc<ReportSink>,
    bus: EventBus,
    settings: EngineSettings,
    state: ConversationState,
    draft: ReportDraft,
    transcript: Vec<TranscriptMessage>,
    input: InputMode,
    counter: u64,
    receipts: ReceiptScheduler,
}

impl ConversationEngine {
    /// Restores the stored session, or starts a new one.
    ///
    /// Never fails: unreadable state is logged and replaced by a fresh
    /// session.
    pub async fn open(
        store: Arc<dyn KeyValueStore>,
        sink: Arc<ReportSink>,
        bus: EventBus,
        settings: EngineSettings,
    ) -> Self {
        let counter = read_or_default::<u64>(store.as_ref(), keys::DEMO_COUNTER).await;
        let saved = read_or_default::<Option<SavedChat>>(store.as_ref(), keys::CHAT_DATA).await;
        let transcript =
            read_or_default::<Option<Vec<TranscriptMessage>>>(store.as_ref(), keys::MESSAGES)
                .await;
        if saved.is_some() && transcript.is_none() {
            warn!("stored chat has no transcript, starting a new session");
        }

        let restored = saved.zip(transcript).and_then(|(saved, transcript)| {
            let step = ConversationStep::from_str(&saved.step).unwrap_or_else(|_| {
                warn!(step = %saved.step, "unknown stored step, resuming at start");
                ConversationStep::Start
            });
            ConversationState::active(step).map(|state| (state, saved.draft, transcript))
        });

        let initial_draft = ReportDraft::new(
            SessionId::generate(),
            WorkerIdentity::demo(counter, &settings.worker_name_prefix, Utc::now()),
            settings.phone.clone(),
            Utc::now(),
        );
        let receipts = ReceiptScheduler::new(settings.receipt_tick);
        let mut engine = Self {
            store,
            sink,
            bus,
            settings,
            state: ConversationState::Start,
            draft: initial_draft,
            transcript: Vec::new(),
            input: InputMode::Options,
            counter,
            receipts,
        };

        match restored {
            Some((state, draft, transcript)) => {
                info!(
                    session_id = %draft.session_id(),
                    step = %state,
                    messages = transcript.len(),
                    "session restored"
                );
                engine.state = state;
                engine.draft = draft;
                engine.transcript = transcript;
            }
            None => engine.start_session().await,
        }
        engine
    }

    pub fn step(&self) -> ConversationStep {
        self.state.step()
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    pub fn session_id(&self) -> &SessionId {
        self.draft.session_id()
    }

    pub fn transcript(&self) -> &[TranscriptMessage] {
        &self.transcript
    }

    pub fn input_mode(&self) -> InputMode {
        self.input
    }

    /// Placeholder of the open free-text input.
    pub fn awaiting_text(&self) -> Option<&'static str> {
        match self.input {
            InputMode::FreeText { placeholder } => Some(placeholder),
            InputMode::Options => None,
        }
    }

    pub fn session_counter(&self) -> u64 {
        self.counter
    }

    pub fn report(&self) -> Option<&CompletedReport> {
        self.state.report()
    }

    /// Buttons of the current step.
    pub fn menu(&self) -> Vec<ReplyOption> {
        flow::menu(self.step(), &self.settings.catalog)
    }

    /// Answers with a button label.
    pub async fn select_option(
        &mut self,
        label: &str,
        next: ConversationStep,
        field: Option<ReportField>,
    ) -> Result<TurnOutcome, FlowError> {
        let event = FlowEvent::Reply {
            text: label.to_string(),
            next,
            field,
        };
        self.apply(event).await
    }

    /// Answers with typed text. Blank text is ignored.
    pub async fn submit_free_text(
        &mut self,
        text: &str,
        next: ConversationStep,
        field: ReportField,
    ) -> Result<TurnOutcome, FlowError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(TurnOutcome::Ignored);
        }
        let event = FlowEvent::Reply {
            text: text.to_string(),
            next,
            field: Some(field),
        };
        self.apply(event).await
    }

    /// Sends typed text for the current step.
    pub async fn send_text(&mut self, text: &str) -> Result<TurnOutcome, FlowError> {
        let step = self.step();
        if step.is_terminal() {
            return Err(FlowError::SessionClosed { step });
        }
        let (Some(next), Some(field)) = (step.successor(), step.field()) else {
            return Err(FlowError::FreeTextNotAccepted { step });
        };
        self.submit_free_text(text, next, field).await
    }

    /// Activates the menu entry at `index`.
    pub async fn choose(&mut self, index: usize) -> Result<TurnOutcome, FlowError> {
        let step = self.step();
        let option = self
            .menu()
            .into_iter()
            .nth(index)
            .ok_or(FlowError::NoSuchOption { step, index })?;

        match option.action {
            ReplyAction::Select => {
                let next = step.successor().ok_or(FlowError::SessionClosed { step })?;
                self.select_option(&option.label, next, step.field()).await
            }
            ReplyAction::Cancel => {
                self.select_option(&option.label, ConversationStep::Cancelled, step.field())
                    .await
            }
            ReplyAction::FreeText { .. } => self.open_free_text().await,
            ReplyAction::Back(target) => self.go_back(target).await,
        }
    }

    /// Opens the free-text input of the current step.
    pub async fn open_free_text(&mut self) -> Result<TurnOutcome, FlowError> {
        let step = self.step();
        if step.is_terminal() {
            return Err(FlowError::SessionClosed { step });
        }
        let placeholder = flow::placeholder(step).ok_or(FlowError::FreeTextNotAccepted { step })?;
        self.input = InputMode::FreeText { placeholder };
        Ok(TurnOutcome::AwaitingText)
    }

    pub async fn close_free_text(&mut self) -> Result<TurnOutcome, FlowError> {
        self.input = InputMode::Options;
        Ok(TurnOutcome::OptionsShown)
    }

    /// Jumps back to an earlier step, keeping collected fields.
    pub async fn go_back(&mut self, target: ConversationStep) -> Result<TurnOutcome, FlowError> {
        self.apply(FlowEvent::Back { target }).await
    }

    /// Discards the current session and starts a new one.
    ///
    /// Completed reports are never touched.
    pub async fn reset(&mut self) {
        self.receipts.cancel_all();
        for key in keys::SESSION_KEYS {
            if let Err(e) = self.store.remove(key).await {
                warn!(key, error = %e, "failed to clear session key");
            }
        }
        info!(session_id = %self.session_id(), step = %self.state, "session reset");
        self.start_session().await;
    }

    /// Applies a delivery receipt. Ticks of other sessions are ignored.
    pub async fn apply_receipt(&mut self, tick: ReceiptTick) -> bool {
        let changed = self.advance_receipt(&tick);
        if changed {
            self.persist_transcript().await;
        }
        changed
    }

    /// Applies every receipt tick that is ready, returning how many changed
    /// a message.
    pub async fn pump_receipts(&mut self) -> usize {
        let mut changed = 0;
        while let Some(tick) = self.receipts.try_next() {
            if self.advance_receipt(&tick) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.persist_transcript().await;
        }
        changed
    }

    /// Waits for the next receipt tick without applying it.
    pub async fn next_receipt(&mut self) -> Option<ReceiptTick> {
        self.receipts.next().await
    }

    fn advance_receipt(&mut self, tick: &ReceiptTick) -> bool {
        if &tick.session_id != self.draft.session_id() {
            debug!(session_id = %tick.session_id, "stale receipt ignored");
            return false;
        }
        self.transcript
            .iter_mut()
            .find(|m| m.id == tick.message_id)
            .is_some_and(|m| m.advance_delivery(tick.state))
    }

    async fn apply(&mut self, event: FlowEvent) -> Result<TurnOutcome, FlowError> {
        let now = Utc::now();
        let transition = flow::transition(&self.state, &self.draft, &event, now)?;

        if let FlowEvent::Reply { text, .. } = &event {
            self.push_user(text.clone());
        }
        self.state = transition.state;
        self.draft = transition.draft;
        self.input = InputMode::Options;

        let mut outcome = match &event {
            FlowEvent::Back { target } => TurnOutcome::Rewound(*target),
            FlowEvent::Reply { .. } => TurnOutcome::Advanced(self.step()),
        };

        for action in transition.actions {
            match action {
                FlowAction::Prompt(step) => {
                    if let Some(text) = flow::prompt(step) {
                        self.push_bot(text);
                    }
                    debug!(
                        session_id = %self.session_id(),
                        from = %transition.from,
                        to = %step,
                        "step advanced"
                    );
                }
                FlowAction::Farewell => {
                    self.push_bot(flow::GOODBYE);
                    info!(
                        session_id = %self.session_id(),
                        at_step = %transition.from,
                        "session cancelled"
                    );
                    self.bus.publish(BusEvent::SessionCancelled {
                        session_id: self.session_id().clone(),
                        at_step: transition.from,
                    });
                    outcome = TurnOutcome::Cancelled;
                }
                FlowAction::Record => {
                    if let Some(report) = self.state.report().cloned() {
                        self.record(&report).await;
                        self.push_bot(flow::COMPLETION);
                        outcome = TurnOutcome::Completed(report);
                    }
                }
            }
        }

        self.persist_chat().await;
        self.persist_transcript().await;
        Ok(outcome)
    }

    async fn record(&self, report: &CompletedReport) {
        let outcome = self.sink.append(report.clone()).await;
        info!(
            session_id = %report.session_id(),
            worker = report.worker_name(),
            site = report.site(),
            persisted = outcome == AppendOutcome::Persisted,
            "report completed"
        );
        self.bus.publish(BusEvent::ReportCompleted {
            report: report.clone(),
        });
    }

    async fn start_session(&mut self) {
        self.counter += 1;
        let now = Utc::now();
        let identity = WorkerIdentity::demo(self.counter, &self.settings.worker_name_prefix, now);
        self.draft = ReportDraft::new(
            SessionId::generate(),
            identity,
            self.settings.phone.clone(),
            now,
        );
        self.state = ConversationState::Start;
        self.input = InputMode::Options;
        self.transcript.clear();
        self.push_bot(flow::welcome(self.draft.worker_name()));

        if let Err(e) = save_json(self.store.as_ref(), keys::DEMO_COUNTER, &self.counter).await {
            warn!(error = %e, "failed to persist session counter");
        }
        self.persist_chat().await;
        self.persist_transcript().await;

        info!(
            session_id = %self.session_id(),
            worker = self.draft.worker_name(),
            "session started"
        );
        self.bus.publish(BusEvent::SessionStarted {
            session_id: self.session_id().clone(),
            worker_name: self.draft.worker_name().to_string(),
        });
    }

    fn push_bot(&mut self, text: impl Into<String>) {
        self.transcript.push(TranscriptMessage::bot(text, Utc::now()));
    }

    fn push_user(&mut self, text: String) {
        let message = TranscriptMessage::user(text, Utc::now());
        self.receipts
            .schedule(self.session_id().clone(), message.id.clone());
        self.transcript.push(message);
    }

    async fn persist_chat(&self) {
        let saved = SavedChat {
            step: self.step().to_string(),
            draft: self.draft.clone(),
        };
        if let Err(e) = save_json(self.store.as_ref(), keys::CHAT_DATA, &saved).await {
            warn!(error = %e, "chat state kept in memory only");
        }
    }

    async fn persist_transcript(&self) {
        if let Err(e) = save_json(self.store.as_ref(), keys::MESSAGES, &self.transcript).await {
            warn!(error = %e, "transcript kept in memory only");
        }
    }
}

/// Reads a JSON value, falling back to the default when absent or unreadable.
async fn read_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match load_json::<T>(store, key).await {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "stored value unreadable, using default");
            T::default()
        }
    }
}
