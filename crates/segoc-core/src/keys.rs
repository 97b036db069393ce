// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage keys shared by the engine, the sink and the CLI.

/// Active draft and its current step.
pub const CHAT_DATA: &str = "segoc-chat-data";

/// Transcript of the active session.
pub const MESSAGES: &str = "segoc-messages";

/// Monotonic demo session counter.
pub const DEMO_COUNTER: &str = "segoc-demo-counter";

/// Append-only list of completed reports.
pub const DASHBOARD_DATA: &str = "segoc-demo-data";

/// Keys cleared by a session reset. The report list is never among them.
pub const SESSION_KEYS: [&str; 2] = [CHAT_DATA, MESSAGES];
