// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report table filtering and sorting.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use segoc_core::CompletedReport;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::stats::parse_percent;

/// Criteria a report must satisfy to be listed. Unset criteria match all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Earliest report date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest report date, inclusive.
    pub date_to: Option<NaiveDate>,
    /// Exact site name.
    pub site: Option<String>,
    /// Exact worker display name.
    pub worker: Option<String>,
    /// Case-insensitive text looked up in the worker, site, sector, activity
    /// and expenses columns.
    pub search: Option<String>,
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn to_date(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    pub fn worker(mut self, worker: impl Into<String>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, report: &CompletedReport) -> bool {
        if self.date_from.is_some_and(|from| report.date() < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| report.date() > to) {
            return false;
        }
        if self.site.as_deref().is_some_and(|site| report.site() != site) {
            return false;
        }
        if self
            .worker
            .as_deref()
            .is_some_and(|worker| report.worker_name() != worker)
        {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                [
                    report.worker_name(),
                    report.site(),
                    report.sector(),
                    report.activity(),
                    report.expenses(),
                ]
                .iter()
                .any(|column| column.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }

    /// Borrowing predicate suitable for `ReportSink::query`.
    pub fn predicate(&self) -> impl Fn(&CompletedReport) -> bool + '_ {
        move |report| self.matches(report)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Worker,
    Site,
    Progress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Sorts in place. Ties keep their insertion order in both directions.
///
/// `Date` orders by the completion timestamp. `Progress` compares the
/// parsed percentage; values without one sort below every number.
pub fn sort_reports(reports: &mut [CompletedReport], field: SortField, direction: SortDirection) {
    reports.sort_by(|a, b| {
        let ordering = compare(a, b, field);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare(a: &CompletedReport, b: &CompletedReport, field: SortField) -> Ordering {
    match field {
        SortField::Date => a.timestamp().cmp(&b.timestamp()),
        SortField::Worker => a.worker_name().cmp(b.worker_name()),
        SortField::Site => a.site().cmp(b.site()),
        SortField::Progress => parse_percent(a.progress()).cmp(&parse_percent(b.progress())),
    }
}

/// Distinct site names, alphabetically, for the filter dropdown.
pub fn distinct_sites(reports: &[CompletedReport]) -> Vec<String> {
    distinct(reports, CompletedReport::site)
}

/// Distinct worker names, alphabetically, for the filter dropdown.
pub fn distinct_workers(reports: &[CompletedReport]) -> Vec<String> {
    distinct(reports, CompletedReport::worker_name)
}

fn distinct(reports: &[CompletedReport], column: fn(&CompletedReport) -> &str) -> Vec<String> {
    reports
        .iter()
        .map(column)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ReportBuilder;
    use std::str::FromStr;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn sample() -> Vec<CompletedReport> {
        vec![
            ReportBuilder::new("a", 1)
                .on(day(2), 9)
                .site("Obra Centro Comercial")
                .progress("75%")
                .expenses("Cemento $40.000")
                .build(),
            ReportBuilder::new("b", 2)
                .on(day(3), 10)
                .site("Obra Industrial Sur")
                .activity("Electricidad")
                .progress("100%")
                .build(),
            ReportBuilder::new("c", 3)
                .on(day(4), 11)
                .site("Obra Centro Comercial")
                .progress("sin medir")
                .build(),
        ]
    }

    fn ids(reports: &[CompletedReport]) -> Vec<&str> {
        reports.iter().map(|r| r.session_id().as_str()).collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ReportFilter::new();
        assert!(filter.is_empty());
        assert!(sample().iter().all(|r| filter.matches(r)));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let filter = ReportFilter::new().from_date(day(3)).to_date(day(4));
        let kept: Vec<_> = sample().into_iter().filter(filter.predicate()).collect();
        assert_eq!(ids(&kept), vec!["b", "c"]);
    }

    #[test]
    fn site_and_worker_match_exactly() {
        let reports = sample();
        let by_site = ReportFilter::new().site("Obra Centro Comercial");
        assert_eq!(reports.iter().filter(|r| by_site.matches(r)).count(), 2);

        let by_worker = ReportFilter::new().worker("Usuario Demo 2");
        assert_eq!(reports.iter().filter(|r| by_worker.matches(r)).count(), 1);

        let partial = ReportFilter::new().site("Obra Centro");
        assert_eq!(reports.iter().filter(|r| partial.matches(r)).count(), 0);
    }

    #[test]
    fn search_is_case_insensitive_across_columns() {
        let reports = sample();
        let count = |text: &str| {
            let filter = ReportFilter::new().search(text);
            reports.iter().filter(|r| filter.matches(r)).count()
        };
        assert_eq!(count("ELECTRICIDAD"), 1);
        assert_eq!(count("cemento"), 1);
        assert_eq!(count("usuario demo 3"), 1);
        assert_eq!(count("   "), 3);
        assert_eq!(count("zzz"), 0);
    }

    #[test]
    fn sort_by_date_defaults_to_newest_first() {
        let mut reports = sample();
        sort_reports(&mut reports, SortField::default(), SortDirection::default());
        assert_eq!(ids(&reports), vec!["c", "b", "a"]);
    }

    #[test]
    fn sort_by_progress_puts_unparseable_lowest() {
        let mut reports = sample();
        sort_reports(&mut reports, SortField::Progress, SortDirection::Asc);
        assert_eq!(ids(&reports), vec!["c", "a", "b"]);
    }

    #[test]
    fn sort_by_site_keeps_ties_in_order() {
        let mut reports = sample();
        sort_reports(&mut reports, SortField::Site, SortDirection::Asc);
        assert_eq!(ids(&reports), vec!["a", "c", "b"]);
    }

    #[test]
    fn dropdown_values_are_distinct_and_sorted() {
        let reports = sample();
        assert_eq!(
            distinct_sites(&reports),
            vec!["Obra Centro Comercial", "Obra Industrial Sur"]
        );
        assert_eq!(distinct_workers(&reports).len(), 3);
    }

    #[test]
    fn sort_options_parse_from_cli_text() {
        assert_eq!(SortField::from_str("Progress").unwrap(), SortField::Progress);
        assert_eq!(SortDirection::from_str("asc").unwrap(), SortDirection::Asc);
        assert!(SortField::from_str("fecha").is_err());
    }
}
