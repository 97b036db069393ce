// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `segoc reports` and `segoc stats` command implementations.

use chrono::Utc;
use colored::Colorize;
use segoc_bus::EventBus;
use segoc_config::SegocConfig;
use segoc_core::{CompletedReport, SegocError};
use segoc_dashboard::{
    DashboardStats, NotificationFeed, ReportFilter, SortDirection, SortField, select_reports,
};
use tracing::debug;

const COLUMNS: [&str; 8] = [
    "Fecha", "Hora", "Operario", "Obra", "Sector", "Actividad", "Progreso", "Gastos",
];

pub async fn run_reports(
    config: &SegocConfig,
    filter: ReportFilter,
    sort: SortField,
    direction: SortDirection,
    json: bool,
) -> Result<(), SegocError> {
    let (_, sink) = crate::open_storage(config).await?;
    let reports = select_reports(&sink, &filter, sort, direction).await;
    debug!(count = reports.len(), sort = %sort, direction = %direction, "reports selected");

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }
    if reports.is_empty() {
        println!("{}", "No hay reportes para mostrar.".dimmed());
        return Ok(());
    }

    let mut lines = render_table(&reports).into_iter();
    if let Some(header) = lines.next() {
        println!("{}", header.bold());
    }
    for line in lines {
        println!("{line}");
    }
    println!("{}", format!("{} reporte(s)", reports.len()).dimmed());
    Ok(())
}

pub async fn run_stats(config: &SegocConfig, json: bool) -> Result<(), SegocError> {
    let (_, sink) = crate::open_storage(config).await?;
    let reports = sink.all().await;
    let stats = DashboardStats::compute(&reports, Utc::now().date_naive());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    print!("{}", render_stats(&stats));

    let mut feed = NotificationFeed::subscribe(&EventBus::default(), config.dashboard.notification_limit);
    feed.seed(&reports);
    if !feed.is_empty() {
        println!("\n{}", "Últimas notificaciones:".bold());
        for notification in feed.latest() {
            println!(
                "  {} {}",
                notification.timestamp.format("%d/%m %H:%M").to_string().dimmed(),
                notification.message
            );
        }
    }
    Ok(())
}

/// Header line followed by one aligned line per report.
fn render_table(reports: &[CompletedReport]) -> Vec<String> {
    let rows: Vec<[String; 8]> = reports
        .iter()
        .map(|r| {
            [
                r.timestamp().format("%d/%m/%Y").to_string(),
                r.timestamp().format("%H:%M").to_string(),
                r.worker_name().to_string(),
                r.site().to_string(),
                r.sector().to_string(),
                r.activity().to_string(),
                r.progress().to_string(),
                r.expenses().to_string(),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![line(&COLUMNS)];
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(line(&cells));
    }
    lines
}

fn render_stats(stats: &DashboardStats) -> String {
    let average = stats
        .average_progress
        .map(|p| format!("{p:.1}%"))
        .unwrap_or_else(|| "-".to_string());
    let mut out = format!(
        "Reportes totales:   {}\n\
         Reportes hoy:       {}\n\
         Operarios activos:  {}\n\
         Obras en progreso:  {}\n\
         Progreso promedio:  {}\n\
         Gastos totales:     ${}\n",
        stats.total_reports,
        stats.reports_today,
        stats.active_workers,
        stats.sites_in_progress,
        average,
        thousands(stats.total_expenses),
    );
    if !stats.site_progress.is_empty() {
        out.push_str("\nProgreso por obra:\n");
        for site in &stats.site_progress {
            let average = site
                .average_progress
                .map(|p| format!("{p:.1}%"))
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "  {}: {} ({} reporte(s))\n",
                site.site, average, site.reports
            ));
        }
    }
    out
}

/// `95000` as `95.000`.
fn thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use segoc_dashboard::SiteProgress;
    use segoc_test_utils::{ReportScript, TestHarness};

    #[test]
    fn thousands_uses_dots() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(950), "950");
        assert_eq!(thousands(95_000), "95.000");
        assert_eq!(thousands(1_234_567), "1.234.567");
    }

    #[test]
    fn stats_render_every_card() {
        let stats = DashboardStats {
            total_reports: 3,
            reports_today: 1,
            active_workers: 2,
            sites_in_progress: 1,
            average_progress: Some(62.5),
            total_expenses: 70_000,
            site_progress: vec![SiteProgress {
                site: "Obra Industrial Sur".into(),
                reports: 3,
                average_progress: None,
            }],
        };
        let text = render_stats(&stats);
        assert!(text.contains("Reportes totales:   3"));
        assert!(text.contains("Progreso promedio:  62.5%"));
        assert!(text.contains("Gastos totales:     $70.000"));
        assert!(text.contains("  Obra Industrial Sur: - (3 reporte(s))"));
    }

    #[tokio::test]
    async fn table_aligns_columns() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness.complete(&ReportScript::default()).await.unwrap();
        harness
            .complete(&ReportScript::default().site("Obra Sur").expenses("Cal $30.000"))
            .await
            .unwrap();
        let reports = harness.sink.all().await;

        let lines = render_table(&reports);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Fecha       Hora   Operario"));
        let obra = lines[0].find("Obra").unwrap();
        assert_eq!(&lines[2][obra..obra + 8], "Obra Sur");
        assert!(lines[2].ends_with("Cal $30.000"));
    }
}
