// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `segoc export` command implementation.

use std::path::PathBuf;

use chrono::Utc;
use colored::Colorize;
use segoc_config::SegocConfig;
use segoc_core::SegocError;
use segoc_dashboard::{ExportFormat, ReportFilter, SortDirection, SortField, select_reports, write_export};

/// Writes the filtered reports, oldest first, and prints the file path.
pub async fn run_export(
    config: &SegocConfig,
    filter: ReportFilter,
    format: ExportFormat,
    out: Option<PathBuf>,
) -> Result<(), SegocError> {
    let (_, sink) = crate::open_storage(config).await?;
    let reports = select_reports(&sink, &filter, SortField::Date, SortDirection::Asc).await;

    let directory = out.unwrap_or_else(|| PathBuf::from(&config.export.directory));
    let path = write_export(
        &reports,
        format,
        &directory,
        &config.export.file_prefix,
        Utc::now().date_naive(),
    )?;

    println!(
        "{} {} reporte(s) en {}",
        "exportado:".green(),
        reports.len(),
        path.display()
    );
    Ok(())
}
