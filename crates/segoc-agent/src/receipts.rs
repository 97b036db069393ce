// SPDX-FileCopyrightText: 2026 SEGOC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cosmetic delivery receipts for user messages.
//!
//! Each scheduled message gets a task that emits `sent`, `delivered` and
//! `read` one tick apart. Every task watches the scheduler's current
//! [`CancellationToken`]; [`ReceiptScheduler::cancel_all`] swaps in a fresh
//! token so timers of a discarded session never fire.
//!
//! At most [`BACKLOG`] ticks wait in the queue. Once it is full, timer tasks
//! hold their tick until the engine pumps receipts again.

use std::time::Duration;

use segoc_core::{DeliveryState, MessageId, SessionId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Ticks buffered between two pumps.
pub const BACKLOG: usize = 32;

/// A receipt update for one message of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptTick {
    pub session_id: SessionId,
    pub message_id: MessageId,
    pub state: DeliveryState,
}

pub struct ReceiptScheduler {
    tick: Duration,
    token: CancellationToken,
    tx: mpsc::Sender<ReceiptTick>,
    rx: mpsc::Receiver<ReceiptTick>,
}

impl ReceiptScheduler {
    pub fn new(tick: Duration) -> Self {
        let (tx, rx) = mpsc::channel(BACKLOG);
        Self {
            tick,
            token: CancellationToken::new(),
            tx,
            rx,
        }
    }

    /// Spawns the tick task for a freshly sent message.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, session_id: SessionId, message_id: MessageId) {
        let token = self.token.clone();
        let tx = self.tx.clone();
        let tick = self.tick;

        tokio::spawn(async move {
            let mut state = DeliveryState::Sending;
            while let Some(next) = state.next() {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        trace!(session_id = %session_id, "receipt timer cancelled");
                        return;
                    }
                    _ = tokio::time::sleep(tick) => {}
                }
                state = next;
                let update = ReceiptTick {
                    session_id: session_id.clone(),
                    message_id: message_id.clone(),
                    state,
                };
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    sent = tx.send(update) => {
                        if sent.is_err() {
                            return;
                        }
                    }
                }
            }
        });
    }

    /// Stops every pending timer and drops ticks already queued.
    pub fn cancel_all(&mut self) {
        self.token.cancel();
        self.token = CancellationToken::new();
        while self.rx.try_recv().is_ok() {}
    }

    /// Returns a tick that is ready now, if any.
    pub fn try_next(&mut self) -> Option<ReceiptTick> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next tick.
    pub async fn next(&mut self) -> Option<ReceiptTick> {
        self.rx.recv().await
    }
}

impl Drop for ReceiptScheduler {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (SessionId, MessageId) {
        (SessionId("s-1".into()), MessageId("m-1".into()))
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_arrive_in_order_one_interval_apart() {
        let mut scheduler = ReceiptScheduler::new(Duration::from_millis(500));
        let (session, message) = ids();
        scheduler.schedule(session.clone(), message.clone());

        let start = tokio::time::Instant::now();
        let mut states = Vec::new();
        for _ in 0..3 {
            let tick = scheduler.next().await.unwrap();
            assert_eq!(tick.session_id, session);
            assert_eq!(tick.message_id, message);
            states.push(tick.state);
        }
        assert_eq!(
            states,
            vec![DeliveryState::Sent, DeliveryState::Delivered, DeliveryState::Read]
        );
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1500));
        assert!(elapsed < Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn unpumped_ticks_wait_without_growing_the_queue() {
        let mut scheduler = ReceiptScheduler::new(Duration::from_millis(100));
        let session = SessionId("s-1".into());
        for i in 0..20 {
            scheduler.schedule(session.clone(), MessageId(format!("m-{i}")));
        }

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(scheduler.rx.len(), BACKLOG);

        let mut received = 0;
        while scheduler.next().await.is_some() {
            received += 1;
            if received == 60 {
                break;
            }
        }
        assert_eq!(received, 60);
        assert!(scheduler.try_next().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_silences_pending_timers() {
        let mut scheduler = ReceiptScheduler::new(Duration::from_millis(500));
        let (session, message) = ids();
        scheduler.schedule(session, message);

        tokio::time::sleep(Duration::from_millis(600)).await;
        scheduler.cancel_all();
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(scheduler.try_next().is_none());
    }
}
