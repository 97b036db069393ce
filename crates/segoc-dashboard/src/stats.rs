// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard summary cards.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use segoc_core::CompletedReport;
use serde::Serialize;

/// Aggregates shown above the report table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_reports: usize,
    pub reports_today: usize,
    /// Distinct worker names.
    pub active_workers: usize,
    /// Distinct sites with at least one report.
    pub sites_in_progress: usize,
    /// Mean of every parseable progress value, `None` when there is none.
    pub average_progress: Option<f64>,
    /// Sum of every `$` amount found in the expense notes.
    pub total_expenses: u64,
    /// One entry per site, alphabetically.
    pub site_progress: Vec<SiteProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteProgress {
    pub site: String,
    pub reports: usize,
    pub average_progress: Option<f64>,
}

#[derive(Default)]
struct SiteTally {
    reports: usize,
    percents: Vec<u32>,
}

impl DashboardStats {
    pub fn compute(reports: &[CompletedReport], today: NaiveDate) -> Self {
        let mut workers = BTreeSet::new();
        let mut sites: BTreeMap<&str, SiteTally> = BTreeMap::new();
        let mut percents = Vec::new();
        let mut total_expenses = 0u64;
        let mut reports_today = 0;

        for report in reports {
            workers.insert(report.worker_name());
            if report.date() == today {
                reports_today += 1;
            }
            total_expenses = total_expenses.saturating_add(parse_amounts(report.expenses()));

            let tally = sites.entry(report.site()).or_default();
            tally.reports += 1;
            if let Some(percent) = parse_percent(report.progress()) {
                tally.percents.push(percent);
                percents.push(percent);
            }
        }

        let site_progress = sites
            .into_iter()
            .map(|(site, tally)| SiteProgress {
                site: site.to_string(),
                reports: tally.reports,
                average_progress: mean(&tally.percents),
            })
            .collect::<Vec<_>>();

        Self {
            total_reports: reports.len(),
            reports_today,
            active_workers: workers.len(),
            sites_in_progress: site_progress.len(),
            average_progress: mean(&percents),
            total_expenses,
            site_progress,
        }
    }
}

fn mean(values: &[u32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: u64 = values.iter().map(|v| u64::from(*v)).sum();
    Some(sum as f64 / values.len() as f64)
}

/// Leading integer of a progress note such as `75%` or ` 30 % aprox`.
pub fn parse_percent(text: &str) -> Option<u32> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Sums every `$` amount in an expense note.
///
/// Amounts use `.` as thousands separator, so `$40.000` is forty thousand.
/// Anything after a `,` is a list separator, not a decimal part.
pub fn parse_amounts(text: &str) -> u64 {
    let mut total = 0u64;
    for chunk in text.split('$').skip(1) {
        let digits: String = chunk
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .filter(char::is_ascii_digit)
            .collect();
        if let Ok(amount) = digits.parse::<u64>() {
            total = total.saturating_add(amount);
        }
    }
    total
}
