// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for SEGOC site reporting.
//!
//! Every section denies unknown fields, so a misspelled key fails the load
//! instead of silently falling back to its default.

use serde::{Deserialize, Serialize};

/// Top-level SEGOC configuration.
///
/// Merged from the XDG config files and `SEGOC_*` environment variables.
/// All sections are optional and default to the stock demo values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SegocConfig {
    /// Bot identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Demo identity and the option menus offered at each step.
    #[serde(default)]
    pub demo: DemoConfig,

    /// Key-value store backend.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cosmetic delays of the chat shell.
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Report export destination.
    #[serde(default)]
    pub export: ExportConfig,

    /// Dashboard read side.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot in the chat header.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Default tracing level for `segoc` targets when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "SEGOC".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Demo identity and per-step reply options.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DemoConfig {
    /// Phone number shown on every session.
    #[serde(default = "default_phone")]
    pub phone: String,

    /// Worker names are `{prefix} {counter}`.
    #[serde(default = "default_worker_name_prefix")]
    pub worker_name_prefix: String,

    #[serde(default = "default_sites")]
    pub sites: Vec<String>,

    #[serde(default = "default_sectors")]
    pub sectors: Vec<String>,

    #[serde(default = "default_activities")]
    pub activities: Vec<String>,

    #[serde(default = "default_progress")]
    pub progress: Vec<String>,

    #[serde(default = "default_expenses")]
    pub expenses: Vec<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            phone: default_phone(),
            worker_name_prefix: default_worker_name_prefix(),
            sites: default_sites(),
            sectors: default_sectors(),
            activities: default_activities(),
            progress: default_progress(),
            expenses: default_expenses(),
        }
    }
}

fn default_phone() -> String {
    "+54 9 11 1234-5678".to_string()
}

fn default_worker_name_prefix() -> String {
    "Usuario Demo".to_string()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn default_sites() -> Vec<String> {
    strings(&[
        "Obra Centro Comercial",
        "Obra Residencial Norte",
        "Obra Industrial Sur",
    ])
}

fn default_sectors() -> Vec<String> {
    strings(&[
        "Sector A - Planta Baja",
        "Sector B - Primer Piso",
        "Sector C - Segundo Piso",
    ])
}

fn default_activities() -> Vec<String> {
    strings(&[
        "Contrapiso",
        "Mampostería",
        "Instalación eléctrica",
        "Pintura",
        "Plomería",
    ])
}

fn default_progress() -> Vec<String> {
    strings(&["10%", "25%", "50%", "75%", "90%", "100%"])
}

fn default_expenses() -> Vec<String> {
    strings(&[
        "Cemento $40.000, Cal $30.000, Arena $25.000",
        "No hubo gastos hoy",
    ])
}

/// Which key-value store backs the engine and the report sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// SQLite file holding the session keys and completed reports.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL mode for the SQLite store.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("segoc").join("segoc.db").display().to_string())
        .unwrap_or_else(|| "segoc.db".to_string())
}

fn default_true() -> bool {
    true
}

/// Cosmetic delays, in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PacingConfig {
    /// Interval between delivery receipt ticks of a user message.
    #[serde(default = "default_receipt_tick_ms")]
    pub receipt_tick_ms: u64,

    /// How long the shell shows the typing indicator before a bot reply.
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            receipt_tick_ms: default_receipt_tick_ms(),
            typing_delay_ms: default_typing_delay_ms(),
        }
    }
}

fn default_receipt_tick_ms() -> u64 {
    500
}

fn default_typing_delay_ms() -> u64 {
    1000
}

/// Report export configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory export files are written to.
    #[serde(default = "default_export_directory")]
    pub directory: String,

    /// File name prefix, e.g. `segoc-reportes-2026-03-02.csv`.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_export_directory() -> String {
    ".".to_string()
}

fn default_file_prefix() -> String {
    "segoc-reportes".to_string()
}

/// Dashboard configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    /// Number of report notifications kept by the feed.
    #[serde(default = "default_notification_limit")]
    pub notification_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            notification_limit: default_notification_limit(),
        }
    }
}

fn default_notification_limit() -> usize {
    5
}
