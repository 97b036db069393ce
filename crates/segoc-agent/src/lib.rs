// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation flow and engine for SEGOC daily site reports.
//!
//! - [`flow`]: the pure step table, transition rules and menus.
//! - [`engine`]: the stateful session driver that persists progress,
//!   records finished reports and publishes bus events.
//! - [`receipts`]: cancellable delivery-receipt timers.

pub mod engine;
pub mod flow;
pub mod receipts;

pub use engine::{ConversationEngine, EngineSettings, InputMode, TurnOutcome};
pub use flow::{ConversationState, MenuCatalog, ReplyAction, ReplyOption};
pub use receipts::{ReceiptScheduler, ReceiptTick};
