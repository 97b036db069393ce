// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Spreadsheet exports of completed reports.
//!
//! All three formats are comma-separated text. `Excel` prefixes a UTF-8 BOM
//! so spreadsheet applications pick the right encoding, and `Sheets` quotes
//! every cell including the header.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use segoc_core::{CompletedReport, SegocError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::info;

pub const HEADER: [&str; 9] = [
    "Fecha", "Hora", "Operario", "Obra", "Sector", "Actividad", "Progreso", "Gastos", "Estado",
];

const BOM: &[u8] = b"\xEF\xBB\xBF";
const NO_EXPENSES: &str = "Sin gastos";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    Sheets,
}

impl ExportFormat {
    /// Download name for an export produced on `date`.
    pub fn file_name(self, prefix: &str, date: NaiveDate) -> String {
        let date = date.format("%Y-%m-%d");
        match self {
            ExportFormat::Csv => format!("{prefix}-{date}.csv"),
            ExportFormat::Excel => format!("{prefix}-{date}.xlsx"),
            ExportFormat::Sheets => format!("{prefix}-sheets-{date}.csv"),
        }
    }
}

fn row(report: &CompletedReport) -> [String; 9] {
    let timestamp = report.timestamp();
    let progress = report.progress().trim();
    let progress = if progress.ends_with('%') {
        progress.to_string()
    } else {
        format!("{progress}%")
    };
    let expenses = match report.expenses().trim() {
        "" => NO_EXPENSES.to_string(),
        text => text.to_string(),
    };
    [
        timestamp.format("%d/%m/%Y").to_string(),
        timestamp.format("%H:%M:%S").to_string(),
        report.worker_name().to_string(),
        report.site().to_string(),
        report.sector().to_string(),
        report.activity().to_string(),
        progress,
        expenses,
        report.status().label().to_string(),
    ]
}

fn export_error(err: impl std::fmt::Display) -> SegocError {
    SegocError::Export(err.to_string())
}

/// Renders `reports` in `format`, one row each in the given order.
pub fn export_reports(reports: &[CompletedReport], format: ExportFormat) -> Result<Vec<u8>, SegocError> {
    if reports.is_empty() {
        return Err(SegocError::Export("no data".into()));
    }

    let mut out = Vec::new();
    let (style, header_written) = match format {
        ExportFormat::Csv => (QuoteStyle::Necessary, false),
        ExportFormat::Sheets => (QuoteStyle::Always, false),
        ExportFormat::Excel => {
            out.extend_from_slice(BOM);
            out.extend_from_slice(HEADER.join(",").as_bytes());
            out.push(b'\n');
            (QuoteStyle::Always, true)
        }
    };

    let mut writer = WriterBuilder::new()
        .quote_style(style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);
    if !header_written {
        writer.write_record(HEADER).map_err(export_error)?;
    }
    for report in reports {
        writer.write_record(row(report)).map_err(export_error)?;
    }
    writer.into_inner().map_err(export_error)
}

/// Exports into `directory` under the format's file name and returns the
/// written path.
pub fn write_export(
    reports: &[CompletedReport],
    format: ExportFormat,
    directory: &Path,
    prefix: &str,
    date: NaiveDate,
) -> Result<PathBuf, SegocError> {
    let bytes = export_reports(reports, format)?;
    std::fs::create_dir_all(directory).map_err(export_error)?;
    let path = directory.join(format.file_name(prefix, date));
    std::fs::write(&path, &bytes).map_err(export_error)?;
    info!(
        format = %format,
        path = %path.display(),
        rows = reports.len(),
        "reports exported"
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ReportBuilder;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn reports() -> Vec<CompletedReport> {
        vec![
            ReportBuilder::new("a", 1)
                .on(day(2), 9)
                .progress("75")
                .expenses("Cemento $40.000, Cal $30.000")
                .build(),
            ReportBuilder::new("b", 2)
                .on(day(3), 14)
                .progress("100%")
                .build(),
        ]
    }

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn empty_selection_is_an_error() {
        let err = export_reports(&[], ExportFormat::Csv).unwrap_err();
        assert!(matches!(err, SegocError::Export(ref m) if m == "no data"));
    }

    #[test]
    fn csv_quotes_only_when_needed() {
        let out = text(export_reports(&reports(), ExportFormat::Csv).unwrap());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER.join(","));
        assert_eq!(
            lines[1],
            "02/03/2026,09:05:00,Usuario Demo 1,Obra Centro Comercial,Sector A - Planta Baja,\
             Pintura,75%,\"Cemento $40.000, Cal $30.000\",Completado"
        );
        assert!(lines[2].contains(",100%,No hubo gastos hoy,Completado"));
    }

    #[test]
    fn blank_expenses_from_older_records_render_placeholder() {
        let mut value = serde_json::to_value(&reports()[0]).unwrap();
        value["expenses"] = serde_json::json!("");
        let legacy: CompletedReport = serde_json::from_value(value).unwrap();

        let out = text(export_reports(&[legacy], ExportFormat::Csv).unwrap());
        assert!(out.lines().nth(1).unwrap().ends_with(",75%,Sin gastos,Completado"));
    }

    #[test]
    fn excel_has_bom_and_plain_header() {
        let bytes = export_reports(&reports(), ExportFormat::Excel).unwrap();
        assert!(bytes.starts_with(BOM));
        let out = text(bytes[BOM.len()..].to_vec());
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some(HEADER.join(",").as_str()));
        let first = lines.next().unwrap();
        assert!(first.starts_with("\"02/03/2026\",\"09:05:00\",\"Usuario Demo 1\""));
        assert!(first.ends_with("\"Completado\""));
    }

    #[test]
    fn sheets_quotes_every_cell() {
        let out = text(export_reports(&reports(), ExportFormat::Sheets).unwrap());
        assert!(out.starts_with("\"Fecha\",\"Hora\",\"Operario\""));
        assert!(!out.starts_with('\u{feff}'));
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn file_names_carry_prefix_and_date() {
        assert_eq!(
            ExportFormat::Csv.file_name("segoc-reportes", day(2)),
            "segoc-reportes-2026-03-02.csv"
        );
        assert_eq!(
            ExportFormat::Excel.file_name("segoc-reportes", day(2)),
            "segoc-reportes-2026-03-02.xlsx"
        );
        assert_eq!(
            ExportFormat::Sheets.file_name("segoc-reportes", day(2)),
            "segoc-reportes-sheets-2026-03-02.csv"
        );
    }

    #[test]
    fn write_export_creates_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested");
        let path = write_export(&reports(), ExportFormat::Csv, &target, "segoc-reportes", day(4)).unwrap();
        assert_eq!(path, target.join("segoc-reportes-2026-03-04.csv"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Fecha,Hora"));
    }
}
