// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for SEGOC site reporting.

use thiserror::Error;

use crate::types::{ConversationStep, ReportField};

/// The primary error type shared by every SEGOC crate.
#[derive(Debug, Error)]
pub enum SegocError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Key-value store errors (connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The conversation rejected an input.
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// Report export failed (empty selection, writer failure).
    #[error("export error: {0}")]
    Export(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SegocError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SegocError::Storage {
            source: Box::new(err),
        }
    }
}

/// Inputs the conversation state machine refuses.
///
/// A rejected input leaves the engine exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// The session already reached `finished` or `cancelled`.
    #[error("session is closed at step `{step}`")]
    SessionClosed { step: ConversationStep },

    /// `to` is neither the canonical successor of `from` nor `cancelled`.
    #[error("cannot move from `{from}` to `{to}`")]
    InvalidTransition {
        from: ConversationStep,
        to: ConversationStep,
    },

    /// The target field does not belong to the step being completed.
    #[error("step `{step}` does not collect field `{field}`")]
    FieldMismatch {
        step: ConversationStep,
        field: ReportField,
    },

    /// The step being completed requires a field but none was given.
    #[error("step `{step}` requires field `{expected}`")]
    MissingField {
        step: ConversationStep,
        expected: ReportField,
    },

    /// Back-navigation target is not an earlier active step.
    #[error("cannot go back from `{from}` to `{to}`")]
    InvalidBackNavigation {
        from: ConversationStep,
        to: ConversationStep,
    },

    /// Free text was sent at a step that only offers fixed options.
    #[error("step `{step}` does not accept free text")]
    FreeTextNotAccepted { step: ConversationStep },

    /// A field-collecting step was answered with blank text.
    #[error("step `{step}` needs a non-blank answer")]
    BlankAnswer { step: ConversationStep },

    /// The menu of the current step has no entry at this position.
    #[error("step `{step}` has no option #{index}")]
    NoSuchOption { step: ConversationStep, index: usize },

    /// A draft was frozen before every field was collected.
    #[error("report is missing fields: {missing:?}")]
    IncompleteReport { missing: Vec<ReportField> },
}
