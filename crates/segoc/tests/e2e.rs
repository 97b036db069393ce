// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests running the `segoc` binary against a temp SQLite file.
//!
//! Each test writes its own config and database under a fresh temp
//! directory, so tests are independent and order-insensitive.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Arc;

use segoc_agent::{ConversationEngine, EngineSettings};
use segoc_bus::EventBus;
use segoc_config::SegocConfig;
use segoc_core::{KeyValueStore, keys};
use segoc_storage::{ReportSink, SqliteStore};
use segoc_test_utils::ReportScript;

struct Workspace {
    dir: tempfile::TempDir,
    config_path: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        Self::with_config_extra("")
    }

    fn with_config_extra(extra: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("segoc.toml");
        let toml = format!(
            "[agent]\nlog_level = \"warn\"\n\n\
             [storage]\ndatabase_path = \"{db}\"\n\n\
             [export]\ndirectory = \"{out}\"\n{extra}",
            db = dir.path().join("segoc.db").display(),
            out = dir.path().join("out").display(),
        );
        std::fs::write(&config_path, toml).unwrap();
        Self { dir, config_path }
    }

    fn config(&self) -> SegocConfig {
        segoc_config::load_and_validate_path(&self.config_path).unwrap()
    }

    fn out_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    async fn seed(&self, scripts: &[ReportScript]) {
        let config = self.config();
        let store = Arc::new(SqliteStore::open(&config.storage).await.unwrap());
        let sink = Arc::new(ReportSink::new(store.clone()));
        for script in scripts {
            let mut engine = ConversationEngine::open(
                store.clone(),
                sink.clone(),
                EventBus::default(),
                EngineSettings::from(&config),
            )
            .await;
            script.run(&mut engine).await.unwrap();
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        segoc(&self.config_path, args)
    }
}

fn segoc(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_segoc"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[tokio::test]
async fn stats_json_counts_seeded_reports() {
    let ws = Workspace::new();
    ws.seed(&[
        ReportScript::default().expenses("Cemento $40.000, Cal $30.000"),
        ReportScript::default().site("Obra Industrial Sur").progress("100%"),
    ])
    .await;

    let output = ws.run(&["stats", "--json"]);
    assert!(output.status.success(), "{output:?}");
    let stats: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(stats["total_reports"], 2);
    assert_eq!(stats["sites_in_progress"], 2);
    assert_eq!(stats["total_expenses"], 70_000);
}

#[tokio::test]
async fn reports_json_applies_filters() {
    let ws = Workspace::new();
    ws.seed(&[
        ReportScript::default(),
        ReportScript::default().site("Obra Industrial Sur"),
    ])
    .await;

    let output = ws.run(&["reports", "--json", "--site", "Obra Industrial Sur"]);
    assert!(output.status.success(), "{output:?}");
    let reports: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["site"], "Obra Industrial Sur");
    assert_eq!(reports[0]["status"], "completed");
}

#[tokio::test]
async fn export_writes_excel_file() {
    let ws = Workspace::new();
    ws.seed(&[ReportScript::default()]).await;

    let output = ws.run(&["export", "--format", "excel"]);
    assert!(output.status.success(), "{output:?}");

    let files: Vec<PathBuf> = std::fs::read_dir(ws.out_dir())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("segoc-reportes-") && name.ends_with(".xlsx"), "{name}");
    let bytes = std::fs::read(&files[0]).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
}

#[test]
fn export_without_reports_fails_with_export_status() {
    let ws = Workspace::new();
    let output = ws.run(&["export"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no data"));
    assert!(!ws.out_dir().exists());
}

#[test]
fn unknown_config_key_fails_before_running() {
    let ws = Workspace::with_config_extra("\n[pacing]\ntyping_delay = 5\n");
    let output = ws.run(&["stats"]);
    assert_eq!(output.status.code(), Some(2));
}

#[tokio::test]
async fn reset_clears_session_and_keeps_reports() {
    let ws = Workspace::new();
    ws.seed(&[ReportScript::default()]).await;

    let output = ws.run(&["reset"]);
    assert!(output.status.success(), "{output:?}");

    let store = SqliteStore::open(&ws.config().storage).await.unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(store);
    for key in keys::SESSION_KEYS {
        assert!(store.get(key).await.unwrap().is_none(), "{key} still stored");
    }
    assert_eq!(ReportSink::new(store).len().await, 1);
}
