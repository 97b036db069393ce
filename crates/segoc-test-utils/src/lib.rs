// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for SEGOC integration tests.
//!
//! # Components
//!
//! - [`TestHarness`] - engine, sink and bus wired over a chosen store
//! - [`FailingStore`] - key-value store whose reads and writes can be made to fail
//! - [`ReportScript`] - answers that walk a session to completion

pub mod failing_store;
pub mod harness;

pub use failing_store::FailingStore;
pub use harness::{ReportScript, TestHarness};
