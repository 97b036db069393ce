// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the conversation engine and its backends.

pub mod store;

pub use store::{KeyValueStore, load_json, save_json};
