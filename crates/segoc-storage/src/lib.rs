// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence layer for SEGOC site reporting.
//!
//! Provides a WAL-mode SQLite key-value store with embedded migrations, an
//! in-memory store for demos and tests, and the append-only [`ReportSink`].

pub mod database;
pub mod migrations;
pub mod queries;
pub mod sink;
pub mod store;

pub use database::Database;
pub use sink::{AppendOutcome, ReportSink};
pub use store::{MemoryStore, SqliteStore, open_store};
