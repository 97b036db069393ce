// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SEGOC - daily construction-site reporting over a guided chat.
//!
//! This is the binary entry point.

mod export;
mod reports;
mod shell;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use segoc_config::SegocConfig;
use segoc_core::{KeyValueStore, SegocError};
use segoc_dashboard::{ExportFormat, ReportFilter, SortDirection, SortField};
use segoc_storage::ReportSink;

/// SEGOC - daily construction-site reporting over a guided chat.
#[derive(Parser, Debug)]
#[command(name = "segoc", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the reporting chat.
    Chat,
    /// List completed reports.
    Reports {
        #[command(flatten)]
        filter: FilterArgs,
        /// Column to sort by (date, worker, site, progress).
        #[arg(long, default_value = "date")]
        sort: SortField,
        /// Sort direction (asc, desc).
        #[arg(long, default_value = "desc")]
        direction: SortDirection,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show dashboard statistics.
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Export completed reports to a spreadsheet file.
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output format (csv, excel, sheets).
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        /// Target directory, overriding `[export] directory`.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Discard the active chat session. Completed reports are kept.
    Reset,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Earliest report date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Latest report date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Exact site name.
    #[arg(long)]
    site: Option<String>,
    /// Exact worker name.
    #[arg(long)]
    worker: Option<String>,
    /// Text searched in worker, site, sector, activity and expenses.
    #[arg(long)]
    search: Option<String>,
}

impl From<FilterArgs> for ReportFilter {
    fn from(args: FilterArgs) -> Self {
        ReportFilter {
            date_from: args.from,
            date_to: args.to,
            site: args.site,
            worker: args.worker,
            search: args.search,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => segoc_config::load_and_validate_path(path),
        None => segoc_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            segoc_config::render_errors(&errors);
            std::process::exit(2);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Chat) => shell::run_chat(&config).await,
        Some(Commands::Reports {
            filter,
            sort,
            direction,
            json,
        }) => reports::run_reports(&config, filter.into(), sort, direction, json).await,
        Some(Commands::Stats { json }) => reports::run_stats(&config, json).await,
        Some(Commands::Export {
            filter,
            format,
            out,
        }) => export::run_export(&config, filter.into(), format, out).await,
        Some(Commands::Reset) => shell::run_reset(&config).await,
        None => {
            println!("segoc: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(exit_code(&e));
    }
}

/// Process exit status for a failed command. Configuration errors exit
/// with 2 before any command runs.
fn exit_code(err: &SegocError) -> i32 {
    match err {
        SegocError::Config(_) => 2,
        SegocError::Storage { .. } | SegocError::Serialization(_) => 3,
        SegocError::Export(_) => 4,
        SegocError::Flow(_) | SegocError::Internal(_) => 1,
    }
}

/// Opens the configured store and the report sink over it.
async fn open_storage(
    config: &SegocConfig,
) -> Result<(Arc<dyn KeyValueStore>, Arc<ReportSink>), SegocError> {
    let store = segoc_storage::open_store(&config.storage).await?;
    let sink = Arc::new(ReportSink::new(store.clone()));
    Ok((store, sink))
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so that `--json` output stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("segoc={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use segoc_core::FlowError;

    #[test]
    fn binary_loads_config_defaults() {
        let config = segoc_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.agent.name, "SEGOC");
    }

    #[test]
    fn reports_arguments_build_a_filter() {
        let cli = Cli::try_parse_from([
            "segoc",
            "reports",
            "--from",
            "2026-03-01",
            "--site",
            "Obra Industrial Sur",
            "--sort",
            "progress",
            "--direction",
            "asc",
        ])
        .unwrap();

        let Some(Commands::Reports {
            filter,
            sort,
            direction,
            json,
        }) = cli.command
        else {
            panic!("expected reports command");
        };
        assert_eq!(sort, SortField::Progress);
        assert_eq!(direction, SortDirection::Asc);
        assert!(!json);

        let filter = ReportFilter::from(filter);
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(filter.site.as_deref(), Some("Obra Industrial Sur"));
        assert!(filter.worker.is_none());
    }

    #[test]
    fn export_defaults_to_csv() {
        let cli = Cli::try_parse_from(["segoc", "export", "--config", "/tmp/segoc.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/segoc.toml")));
        let Some(Commands::Export { format, out, .. }) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(format, ExportFormat::Csv);
        assert!(out.is_none());
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(Cli::try_parse_from(["segoc", "export", "--format", "pdf"]).is_err());
        assert!(Cli::try_parse_from(["segoc", "reports", "--from", "ayer"]).is_err());
    }

    #[test]
    fn errors_map_to_distinct_exit_codes() {
        assert_eq!(exit_code(&SegocError::Config("x".into())), 2);
        assert_eq!(exit_code(&SegocError::storage(std::io::Error::other("disk"))), 3);
        assert_eq!(exit_code(&SegocError::Export("no data".into())), 4);
        let flow = SegocError::from(FlowError::SessionClosed {
            step: segoc_core::ConversationStep::Finished,
        });
        assert_eq!(exit_code(&flow), 1);
    }
}
