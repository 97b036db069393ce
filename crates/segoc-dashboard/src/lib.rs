// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read side of SEGOC: everything the supervisor dashboard derives from the
//! completed reports held by the [`ReportSink`].

pub mod export;
pub mod filters;
pub mod notifications;
pub mod stats;

use segoc_core::CompletedReport;
use segoc_storage::ReportSink;

pub use export::{ExportFormat, export_reports, write_export};
pub use filters::{ReportFilter, SortDirection, SortField, distinct_sites, distinct_workers, sort_reports};
pub use notifications::{Notification, NotificationFeed};
pub use stats::{DashboardStats, SiteProgress};

/// Reports accepted by `filter`, sorted for display.
pub async fn select_reports(
    sink: &ReportSink,
    filter: &ReportFilter,
    field: SortField,
    direction: SortDirection,
) -> Vec<CompletedReport> {
    let mut reports = sink.query(filter.predicate()).await;
    sort_reports(&mut reports, field, direction);
    reports
}
