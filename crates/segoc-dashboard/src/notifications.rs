// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded feed of "report completed" notifications fed by the event bus.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use segoc_bus::{BusEvent, Envelope, EventBus};
use segoc_core::CompletedReport;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

pub const TITLE: &str = "Nuevo reporte completado";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    pub fn for_report(report: &CompletedReport) -> Self {
        Self {
            id: format!("report-{}", report.session_id()),
            title: TITLE.to_string(),
            message: format!(
                "{} completó el reporte de {}",
                report.worker_name(),
                report.site()
            ),
            timestamp: report.timestamp(),
            read: false,
        }
    }
}

/// Keeps the newest `limit` notifications.
///
/// A report is announced at most once per feed: ids that were evicted or
/// dismissed are remembered and never added again.
pub struct NotificationFeed {
    rx: broadcast::Receiver<Envelope>,
    limit: usize,
    items: VecDeque<Notification>,
    seen: HashSet<String>,
}

impl NotificationFeed {
    /// Subscribes to `bus`. Only events published after this call are seen.
    pub fn subscribe(bus: &EventBus, limit: usize) -> Self {
        Self {
            rx: bus.subscribe(),
            limit: limit.max(1),
            items: VecDeque::new(),
            seen: HashSet::new(),
        }
    }

    /// Fills the feed from already stored reports, oldest first.
    pub fn seed<'a>(&mut self, reports: impl IntoIterator<Item = &'a CompletedReport>) {
        for report in reports {
            self.push(Notification::for_report(report));
        }
    }

    /// Drains pending bus events, returning how many notifications were added.
    pub fn poll(&mut self) -> usize {
        let mut added = 0;
        loop {
            match self.rx.try_recv() {
                Ok(Envelope {
                    event: BusEvent::ReportCompleted { report },
                    ..
                }) => {
                    if self.push(Notification::for_report(&report)) {
                        added += 1;
                    }
                }
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "notification feed fell behind the bus");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        if added > 0 {
            debug!(added, unread = self.unread_count(), "notifications received");
        }
        added
    }

    fn push(&mut self, notification: Notification) -> bool {
        if !self.seen.insert(notification.id.clone()) {
            return false;
        }
        self.items.push_front(notification);
        self.items.truncate(self.limit);
        true
    }

    /// Newest first.
    pub fn latest(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        self.items.iter_mut().for_each(|n| n.read = true);
    }

    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }
}
